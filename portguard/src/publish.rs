//! Publication of the config record consumed by the kernel program.

use portguard_common::FilterConfig;

use crate::Result;

/// Index of the single config record in the shared store.
pub const CONFIG_INDEX: u32 = 0;

/// Write access to the key-value store exposed by the loaded program.
///
/// Only [`CONFIG_INDEX`] is ever written, but the store is keyed by
/// arbitrary small integers, so the abstraction keeps that shape. The
/// control plane never reads back.
pub trait ConfigStore {
    fn write(&mut self, key: u32, value: FilterConfig) -> Result<()>;
}

/// Publish the resolved local address into the shared store.
///
/// This has to complete before the program is attached; attaching first
/// would let the kernel side process packets with no address configured.
pub fn publish_local_address<S: ConfigStore>(store: &mut S, local_address: u32) -> Result<()> {
    store.write(CONFIG_INDEX, FilterConfig { local_address })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        writes: Vec<(u32, FilterConfig)>,
    }

    impl ConfigStore for Recorder {
        fn write(&mut self, key: u32, value: FilterConfig) -> crate::Result<()> {
            self.writes.push((key, value));
            Ok(())
        }
    }

    #[test]
    fn writes_one_record_at_index_zero() {
        let mut store = Recorder::default();
        publish_local_address(&mut store, 0x0A01_A8C0).unwrap();
        assert_eq!(
            store.writes,
            vec![(
                CONFIG_INDEX,
                FilterConfig {
                    local_address: 0x0A01_A8C0
                }
            )]
        );
    }
}
