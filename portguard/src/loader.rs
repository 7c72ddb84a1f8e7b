//! Loading of the precompiled XDP object and access to its kernel
//! resources.

use std::path::Path;

use aya::maps::Array;
use aya::programs::xdp::XdpLinkId;
use aya::programs::{Xdp, XdpFlags};
use aya::{Btf, Ebpf, EbpfLoader};
use aya_log::EbpfLogger;
use log::{debug, warn};
use portguard_common::FilterConfig;

use crate::attach::XdpHook;
use crate::publish::ConfigStore;
use crate::{Error, Result};

/// XDP entry point inside the object file.
pub const PROGRAM_NAME: &str = "xdp_kernel";
/// Config map shared with the kernel program.
pub const CONFIG_MAP: &str = "config_map";
/// Default location of the precompiled object file.
pub const DEFAULT_OBJECT_PATH: &str = "kernel/xdp_kernel.o";

/// Owner of the kernel-resident program for the process lifetime.
///
/// Dropping the handle releases the program once no attachment remains,
/// which also covers the fatal paths where attach was never reached.
pub struct LoadedProgram {
    bpf: Ebpf,
    link: Option<XdpLinkId>,
}

impl LoadedProgram {
    /// Load the object file into the kernel and resolve the entry point.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        // Bump the memlock rlimit. Older kernels account BPF maps and
        // programs against RLIMIT_MEMLOCK instead of cgroup memory.
        let rlim = libc::rlimit {
            rlim_cur: libc::RLIM_INFINITY,
            rlim_max: libc::RLIM_INFINITY,
        };
        let ret = unsafe { libc::setrlimit(libc::RLIMIT_MEMLOCK, &rlim) };
        if ret != 0 {
            debug!("remove limit on locked memory failed, ret is: {ret}");
        }

        let btf = Btf::from_sys_fs().ok();
        let mut bpf = EbpfLoader::new().btf(btf.as_ref()).load_file(path)?;

        if let Err(e) = EbpfLogger::init(&mut bpf) {
            // Expected for objects that log through the raw trace channel
            // instead of aya-log.
            warn!("failed to initialize eBPF logger: {e}");
        }

        let program: &mut Xdp = bpf
            .program_mut(PROGRAM_NAME)
            .ok_or(Error::ProgramNotFound(PROGRAM_NAME))?
            .try_into()
            .map_err(Error::ProgramLoad)?;
        program.load().map_err(Error::ProgramLoad)?;

        Ok(Self { bpf, link: None })
    }

    fn program_mut(&mut self) -> Result<&mut Xdp> {
        self.bpf
            .program_mut(PROGRAM_NAME)
            .ok_or(Error::ProgramNotFound(PROGRAM_NAME))?
            .try_into()
            .map_err(Error::ProgramLoad)
    }
}

impl ConfigStore for LoadedProgram {
    fn write(&mut self, key: u32, value: FilterConfig) -> Result<()> {
        let map = self
            .bpf
            .map_mut(CONFIG_MAP)
            .ok_or(Error::MapNotFound(CONFIG_MAP))?;
        let mut records: Array<_, FilterConfig> = Array::try_from(map)?;
        records.set(key, value, 0)?;
        Ok(())
    }
}

impl XdpHook for LoadedProgram {
    fn attach(&mut self, iface: &str, flags: XdpFlags) -> Result<()> {
        let program = self.program_mut()?;
        let link = program.attach(iface, flags).map_err(Error::Attach)?;
        self.link = Some(link);
        Ok(())
    }

    fn detach(&mut self) -> Result<()> {
        if let Some(link) = self.link.take() {
            let program = self.program_mut()?;
            program.detach(link).map_err(Error::Detach)?;
        }
        Ok(())
    }
}
