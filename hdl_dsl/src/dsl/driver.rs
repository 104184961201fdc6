use crate::error::{BuildError, BuildResult};
use crate::hdl::value::Signal;
use crate::src_loc::SrcLoc;
use indexmap::IndexMap;

/// Tracks which domain drives each signal. A signal can only ever be driven from a single domain.
#[derive(Debug, Default)]
pub struct DriverRegistry {
    driving: IndexMap<Signal, String>,
}

impl DriverRegistry {
    /// Check that `signal` may be driven from `domain`, without registering it.
    pub fn check(&self, signal: &Signal, domain: &str, src_loc: SrcLoc) -> BuildResult<()> {
        match self.driving.get(signal) {
            Some(curr) if curr != domain => Err(BuildError::driver_conflict(
                format!(
                    "Driver-driver conflict: trying to drive {:?} from d.{}, but it is already driven from d.{}",
                    signal, domain, curr
                ),
                src_loc,
            )),
            _ => Ok(()),
        }
    }

    pub fn drive(&mut self, signal: &Signal, domain: &str, src_loc: SrcLoc) -> BuildResult<()> {
        self.check(signal, domain, src_loc)?;
        self.driving.entry(signal.clone()).or_insert_with(|| domain.to_owned());
        Ok(())
    }

    pub fn driver(&self, signal: &Signal) -> Option<&str> {
        self.driving.get(signal).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.driving.len()
    }
}

#[cfg(test)]
mod test {
    use crate::dsl::driver::DriverRegistry;
    use crate::error::BuildErrorKind;
    use crate::hdl::value::{Shape, Signal};
    use crate::src_loc::SrcLoc;

    #[test]
    fn same_domain_twice_is_fine() {
        let mut drivers = DriverRegistry::default();
        let s = Signal::new("s", Shape::unsigned(1));
        drivers.drive(&s, "sync", SrcLoc::caller()).unwrap();
        drivers.drive(&s, "sync", SrcLoc::caller()).unwrap();
        assert_eq!(drivers.driver(&s), Some("sync"));
        assert_eq!(drivers.len(), 1);
    }

    #[test]
    fn second_domain_conflicts() {
        let mut drivers = DriverRegistry::default();
        let s = Signal::new("s", Shape::unsigned(1));
        drivers.drive(&s, "comb", SrcLoc::caller()).unwrap();
        let err = drivers.drive(&s, "sync", SrcLoc::caller()).unwrap_err();
        assert_eq!(err.kind, BuildErrorKind::DriverConflict);
        assert!(err.message.contains("d.comb"));
        assert!(err.message.contains("d.sync"));
        // the first driver stays registered
        assert_eq!(drivers.driver(&s), Some("comb"));
    }

    #[test]
    fn check_does_not_register() {
        let mut drivers = DriverRegistry::default();
        let s = Signal::new("s", Shape::unsigned(1));
        let t = Signal::new("t", Shape::unsigned(1));
        drivers.drive(&s, "comb", SrcLoc::caller()).unwrap();

        drivers.check(&t, "sync", SrcLoc::caller()).unwrap();
        assert_eq!(drivers.driver(&t), None);
        let err = drivers.check(&s, "sync", SrcLoc::caller()).unwrap_err();
        assert_eq!(err.kind, BuildErrorKind::DriverConflict);
        assert_eq!(drivers.len(), 1);
    }
}
