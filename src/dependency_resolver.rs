use super::errors::ResolveErrorKind;
use crate::Container;

/// Value that can be stored in the container and handed out on request.
///
/// Reference-semantic capabilities are expressed as `Arc<T>` or `Arc<dyn Trait + Send + Sync>`,
/// so every clone handed out shares the cached instance.
pub trait Capability: Clone + Send + Sync + 'static {}

impl<T: Clone + Send + Sync + 'static> Capability for T {}

/// Set of factory arguments resolved through the container before the factory is called.
pub trait DependencyResolver: Sized + 'static {
    type Error: Into<ResolveErrorKind>;

    fn resolve(container: &Container) -> Result<Self, Self::Error>;
}

macro_rules! impl_dependency_resolver {
    (
        [$($ty:ident),*]
    ) => {
        #[allow(non_snake_case, unused_mut)]
        impl<$($ty,)*> DependencyResolver for ($($ty,)*)
        where
            $( $ty: Capability, )*
        {
            type Error = ResolveErrorKind;

            // Tuple fields are evaluated left to right
            #[inline]
            #[allow(unused_variables)]
            fn resolve(container: &Container) -> Result<Self, Self::Error> {
                Ok(($(container.try_get::<$ty>()?,)*))
            }
        }
    };
}

all_the_tuples!(impl_dependency_resolver);
