//! Attachment state for the loaded XDP program.

use aya::programs::XdpFlags;

use crate::Result;

/// Kernel-side attach/detach operations, implemented by
/// [`LoadedProgram`](crate::loader::LoadedProgram).
pub trait XdpHook {
    fn attach(&mut self, iface: &str, flags: XdpFlags) -> Result<()>;
    fn detach(&mut self) -> Result<()>;
}

/// Whether the program is currently spliced into an interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentState {
    Unattached,
    Attached,
}

/// Tracks the attachment so detach is safe on every exit path.
pub struct AttachmentManager {
    state: AttachmentState,
}

impl AttachmentManager {
    pub fn new() -> Self {
        Self {
            state: AttachmentState::Unattached,
        }
    }

    pub fn state(&self) -> AttachmentState {
        self.state
    }

    /// Splice the program into the interface's receive path. Calling
    /// while already attached is a no-op.
    pub fn attach<H: XdpHook>(&mut self, hook: &mut H, iface: &str, flags: XdpFlags) -> Result<()> {
        if self.state == AttachmentState::Attached {
            return Ok(());
        }
        hook.attach(iface, flags)?;
        self.state = AttachmentState::Attached;
        Ok(())
    }

    /// Remove the attachment. Calling while unattached is a no-op, so
    /// teardown can run unconditionally.
    pub fn detach<H: XdpHook>(&mut self, hook: &mut H) -> Result<()> {
        if self.state == AttachmentState::Unattached {
            return Ok(());
        }
        hook.detach()?;
        self.state = AttachmentState::Unattached;
        Ok(())
    }
}

impl Default for AttachmentManager {
    fn default() -> Self {
        Self::new()
    }
}
