use alloc::boxed::Box;
use core::{
    any::TypeId,
    fmt::{self, Display, Formatter},
};

use super::{instantiate::InstantiateErrorKind, instantiator::InstantiatorErrorKind};
use crate::any::TypeInfo;

/// Error of a resolution.
///
/// Every variant points to a wiring mistake, not to a runtime condition, so callers are expected to
/// treat it as fatal. [`crate::Container::get`] and [`crate::Container::verify`] panic with it.
#[derive(thiserror::Error, Debug)]
pub enum ResolveErrorKind {
    #[error("Type {type_info} hasn't been registered in container")]
    NoInstantiator { type_info: TypeInfo },
    #[error("Cyclic dependency detected: {}", Chain(chain))]
    CyclicDependency { chain: Box<[TypeInfo]> },
    #[error("Incorrect instantiator provides type. Actual: {actual:?}, expected: {expected}")]
    IncorrectType { expected: TypeInfo, actual: TypeId },
    #[error(transparent)]
    Instantiator(InstantiatorErrorKind<Box<ResolveErrorKind>, InstantiateErrorKind>),
}

impl ResolveErrorKind {
    /// Returns the innermost error, skipping the layers added by every dependent factory on the way up.
    #[must_use]
    pub fn root_cause(&self) -> &ResolveErrorKind {
        match self {
            Self::Instantiator(InstantiatorErrorKind::Deps(err)) => err.root_cause(),
            _ => self,
        }
    }
}

struct Chain<'a>(&'a [TypeInfo]);

impl Display for Chain<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut iter = self.0.iter();
        if let Some(type_info) = iter.next() {
            write!(f, "{type_info}")?;
        }
        for type_info in iter {
            write!(f, " -> {type_info}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::{InstantiateErrorKind, InstantiatorErrorKind, ResolveErrorKind};
    use crate::any::TypeInfo;

    use alloc::{boxed::Box, string::ToString as _, vec};

    struct A;
    struct B;

    #[test]
    fn test_cycle_display() {
        let err = ResolveErrorKind::CyclicDependency {
            chain: vec![TypeInfo::of::<A>(), TypeInfo::of::<B>(), TypeInfo::of::<A>()].into_boxed_slice(),
        };
        let a = TypeInfo::of::<A>().name;
        let b = TypeInfo::of::<B>().name;

        assert_eq!(err.to_string(), std::format!("Cyclic dependency detected: {a} -> {b} -> {a}"));
    }

    #[test]
    fn test_root_cause_is_displayed_through_layers() {
        let missing = ResolveErrorKind::NoInstantiator {
            type_info: TypeInfo::of::<B>(),
        };
        let expected = missing.to_string();
        let err = ResolveErrorKind::Instantiator(InstantiatorErrorKind::Deps(Box::new(ResolveErrorKind::Instantiator(
            InstantiatorErrorKind::Deps(Box::new(missing)),
        ))));

        assert_eq!(err.to_string(), expected);
        assert!(matches!(
            err.root_cause(),
            ResolveErrorKind::NoInstantiator { type_info } if *type_info == TypeInfo::of::<B>()
        ));
    }

    #[test]
    fn test_factory_error_is_root_cause() {
        let err = ResolveErrorKind::Instantiator(InstantiatorErrorKind::Factory(InstantiateErrorKind::Custom(anyhow::anyhow!(
            "port is not configured"
        ))));

        assert_eq!(err.to_string(), "port is not configured");
        assert!(matches!(err.root_cause(), ResolveErrorKind::Instantiator(InstantiatorErrorKind::Factory(_))));
    }
}
