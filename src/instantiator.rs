use alloc::boxed::Box;
use core::any::Any;
use tracing::debug;

use super::{
    dependency_resolver::{Capability, DependencyResolver},
    errors::{InstantiateErrorKind, InstantiatorErrorKind, ResolveErrorKind},
};
use crate::Container;

/// Constructor whose arguments are capabilities resolved by the container.
///
/// Implemented for every `FnMut` of up to three arguments, so plain constructors like `Vehicle::new` can be registered.
pub trait Factory<Deps>: Clone + 'static
where
    Deps: DependencyResolver,
{
    type Provides: 'static;

    fn construct(&mut self, dependencies: Deps) -> Self::Provides;
}

/// Fallible form of [`Factory`].
pub trait Instantiator<Deps>: Clone + 'static
where
    Deps: DependencyResolver,
{
    type Provides: 'static;
    type Error: Into<InstantiateErrorKind>;

    fn instantiate(&mut self, dependencies: Deps) -> Result<Self::Provides, Self::Error>;
}

pub(crate) type BoxedAny = Box<dyn Any + Send + Sync>;

pub(crate) type InstantiatorResult = Result<BoxedAny, InstantiatorErrorKind<ResolveErrorKind, InstantiateErrorKind>>;

/// Type-erased factory in its canonical container-taking form.
///
/// It's cloned out of the registry before the call, so the registry lock isn't held while it runs.
pub(crate) struct BoxedCloneInstantiator(Box<dyn CloneInstantiator>);

pub(crate) trait CloneInstantiator: Send + Sync {
    fn call(&mut self, container: &Container) -> InstantiatorResult;

    #[must_use]
    fn clone_box(&self) -> Box<dyn CloneInstantiator>;
}

impl<F> CloneInstantiator for F
where
    F: FnMut(&Container) -> InstantiatorResult + Clone + Send + Sync + 'static,
{
    #[inline]
    fn call(&mut self, container: &Container) -> InstantiatorResult {
        self(container)
    }

    #[inline]
    fn clone_box(&self) -> Box<dyn CloneInstantiator> {
        Box::new(self.clone())
    }
}

impl BoxedCloneInstantiator {
    #[inline]
    #[must_use]
    fn new(instantiator: impl CloneInstantiator + 'static) -> Self {
        Self(Box::new(instantiator))
    }

    #[inline]
    pub(crate) fn call(&mut self, container: &Container) -> InstantiatorResult {
        self.0.call(container)
    }
}

impl Clone for BoxedCloneInstantiator {
    #[inline]
    fn clone(&self) -> Self {
        Self(self.0.clone_box())
    }
}

#[must_use]
pub(crate) fn boxed_factory<F, Deps>(factory: F) -> BoxedCloneInstantiator
where
    F: Factory<Deps> + Send + Sync,
    F::Provides: Capability,
    Deps: DependencyResolver<Error = ResolveErrorKind>,
{
    BoxedCloneInstantiator::new({
        move |container: &Container| -> InstantiatorResult {
            let dependencies = match Deps::resolve(container) {
                Ok(dependencies) => dependencies,
                Err(err) => return Err(InstantiatorErrorKind::Deps(err)),
            };
            let dependency = factory.clone().construct(dependencies);

            debug!("Resolved");

            Ok(Box::new(dependency) as _)
        }
    })
}

#[must_use]
pub(crate) fn boxed_instantiator<Inst, Deps>(instantiator: Inst) -> BoxedCloneInstantiator
where
    Inst: Instantiator<Deps> + Send + Sync,
    Inst::Provides: Capability,
    Deps: DependencyResolver<Error = ResolveErrorKind>,
{
    BoxedCloneInstantiator::new({
        move |container: &Container| -> InstantiatorResult {
            let dependencies = match Deps::resolve(container) {
                Ok(dependencies) => dependencies,
                Err(err) => return Err(InstantiatorErrorKind::Deps(err)),
            };
            let dependency = match instantiator.clone().instantiate(dependencies) {
                Ok(dependency) => dependency,
                Err(err) => return Err(InstantiatorErrorKind::Factory(err.into())),
            };

            debug!("Resolved");

            Ok(Box::new(dependency) as _)
        }
    })
}

#[must_use]
pub(crate) fn boxed_container_factory<F, Dep>(factory: F) -> BoxedCloneInstantiator
where
    F: FnMut(&Container) -> Dep + Clone + Send + Sync + 'static,
    Dep: Capability,
{
    BoxedCloneInstantiator::new({
        move |container: &Container| -> InstantiatorResult {
            let dependency = factory.clone()(container);

            debug!("Resolved");

            Ok(Box::new(dependency) as _)
        }
    })
}

macro_rules! impl_factory {
    (
        [$($ty:ident),*]
    ) => {
        #[allow(non_snake_case)]
        impl<F, Response, $($ty,)*> Factory<($($ty,)*)> for F
        where
            F: FnMut($($ty,)*) -> Response + Clone + 'static,
            Response: 'static,
            $( $ty: Capability, )*
        {
            type Provides = Response;

            fn construct(&mut self, ($($ty,)*): ($($ty,)*)) -> Self::Provides {
                self($($ty,)*)
            }
        }
    };
}

all_the_tuples!(impl_factory);

macro_rules! impl_instantiator {
    (
        [$($ty:ident),*]
    ) => {
        #[allow(non_snake_case)]
        impl<F, Response, Err, $($ty,)*> Instantiator<($($ty,)*)> for F
        where
            F: FnMut($($ty,)*) -> Result<Response, Err> + Clone + 'static,
            Response: 'static,
            Err: Into<InstantiateErrorKind>,
            $( $ty: Capability, )*
        {
            type Provides = Response;
            type Error = Err;

            fn instantiate(&mut self, ($($ty,)*): ($($ty,)*)) -> Result<Self::Provides, Self::Error> {
                self($($ty,)*)
            }
        }
    };
}

all_the_tuples!(impl_instantiator);

/// Wrapper to create a factory that just returns clones of the passed value.
/// It can be used when the value was created outside the container.
#[inline]
#[must_use]
pub fn instance<T: Capability>(val: T) -> impl Factory<(), Provides = T> + Send + Sync {
    move || val.clone()
}

/// Creates an `Arc<dyn Trait>` from a value, optionally including supertraits.
///
/// # Syntax
/// ```text
/// shared!(value; Trait [+ SuperTrait1 [+ SuperTrait2 ...]])
/// ```
///
/// # Examples
/// ```rust
/// use dicon::{shared, Container};
/// use std::sync::Arc;
///
/// trait Engine: Send + Sync {}
///
/// struct V8Engine;
///
/// impl Engine for V8Engine {}
///
/// let container = Container::new(|cfg| {
///     cfg.register(|| shared!(V8Engine; Engine));
/// });
///
/// let engine: Arc<dyn Engine> = container.get();
/// ```
#[macro_export]
macro_rules! shared {
    ($val:expr ; $capability:tt $($super_traits:tt)*) => {{
        $crate::__private::Arc::new($val) as $crate::__private::Arc<dyn $capability $($super_traits)*>
    }};
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::{boxed_container_factory, boxed_factory, boxed_instantiator, instance, DependencyResolver, Factory};
    use crate::{
        errors::{InstantiateErrorKind, InstantiatorErrorKind, ResolveErrorKind},
        Container,
    };

    use alloc::{
        format,
        string::{String, ToString as _},
        sync::Arc,
    };
    use core::sync::atomic::{AtomicU8, Ordering};
    use tracing::debug;
    use tracing_test::traced_test;

    #[derive(Clone)]
    struct Request(bool);
    #[derive(Clone)]
    struct Response(bool);

    #[test]
    #[allow(dead_code)]
    fn test_factory_helper() {
        fn resolver<Deps: DependencyResolver, F: Factory<Deps>>(_f: F) {}
        fn resolver_with_dep() {
            resolver(|| ());
            resolver(|Request(val)| Response(val));
            resolver(|_: Request, _: Response, _: Request| ());
            resolver(instance(Request(true)));
        }
    }

    #[test]
    #[traced_test]
    fn test_boxed_factory() {
        let request_call_count = Arc::new(AtomicU8::new(0));
        let response_call_count = Arc::new(AtomicU8::new(0));

        let container = Container::new(|cfg| {
            let request_call_count = request_call_count.clone();
            cfg.register(move || {
                request_call_count.fetch_add(1, Ordering::SeqCst);

                debug!("Call factory request");
                Request(true)
            });
        });

        let mut factory_response = boxed_factory({
            let response_call_count = response_call_count.clone();
            move |Request(val_1), Request(val_2)| {
                assert_eq!(val_1, val_2);

                response_call_count.fetch_add(1, Ordering::SeqCst);

                debug!("Call factory response");
                Response(val_1)
            }
        });

        let response_1 = factory_response.call(&container).unwrap();
        let response_2 = factory_response.call(&container).unwrap();

        assert!(response_1.downcast::<Response>().unwrap().0);
        assert!(response_2.downcast::<Response>().unwrap().0);
        // Request is cached by the container, response is cached only through `Container::get`
        assert_eq!(request_call_count.load(Ordering::SeqCst), 1);
        assert_eq!(response_call_count.load(Ordering::SeqCst), 2);
        assert!(logs_contain("Call factory response"));
    }

    #[test]
    #[traced_test]
    fn test_boxed_instantiator_errors() {
        let container = Container::new(|_| {});

        let mut failing = boxed_instantiator(|| Err::<Response, _>(anyhow::anyhow!("Request is malformed")));
        let mut missing_deps = boxed_instantiator(|Request(val)| Ok::<_, InstantiateErrorKind>(Response(val)));

        match failing.call(&container) {
            Err(InstantiatorErrorKind::Factory(err)) => assert_eq!(err.to_string(), "Request is malformed"),
            _ => panic!("expected factory error"),
        }
        match missing_deps.call(&container) {
            Err(InstantiatorErrorKind::Deps(ResolveErrorKind::NoInstantiator { type_info })) => {
                assert!(type_info.name.ends_with("Request"));
            }
            _ => panic!("expected dependency error"),
        }
    }

    #[test]
    #[traced_test]
    fn test_boxed_container_factory() {
        let container = Container::new(|cfg| {
            cfg.register(instance(Request(true)));
        });

        let mut factory = boxed_container_factory(|container: &Container| Response(container.get::<Request>().0));

        let response = factory.call(&container).unwrap();

        assert!(response.downcast::<Response>().unwrap().0);
    }

    #[test]
    fn test_instance_returns_clones() {
        let value = Arc::new(Request(true));
        let mut factory = instance(value.clone());

        assert!(Arc::ptr_eq(&factory.construct(()), &value));
        assert!(Arc::ptr_eq(&factory.construct(()), &value));
    }
}
