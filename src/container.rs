use alloc::{boxed::Box, sync::Arc, vec::Vec};
use core::any::Any;
use parking_lot::{Mutex, ReentrantMutex, RwLock};
use tracing::{debug, error, info_span};

use super::cache::Cache;
use crate::{
    any::TypeInfo,
    config::Config,
    configurator::Configurator,
    dependency_resolver::Capability,
    errors::{InstantiatorErrorKind, ResolveErrorKind},
    instantiator::{BoxedAny, BoxedCloneInstantiator},
    registry::{InstantiatorData, Registry},
    resolution::{ResolutionGuard, ResolutionStack},
};

/// Type-keyed dependency injection container.
///
/// Maps a requested type (a capability) to the factory registered for it, resolves factory arguments
/// recursively through itself and caches every built instance for the container's lifetime.
///
/// Cloning the container is cheap, clones share the registry and the cache.
///
/// # Thread safety
/// The container is [`Send`] and [`Sync`]. The check-cache, build and store sequence runs under a reentrant lock,
/// so concurrent first resolution still builds a cached capability once.
/// A factory must not wait on another thread that resolves from the same container, this deadlocks.
#[derive(Clone)]
pub struct Container {
    pub(crate) inner: Arc<ContainerInner>,
}

impl Container {
    /// Creates a container and configures it with the callback.
    ///
    /// The callback is called synchronously with a [`Configurator`] bound to the new container,
    /// all registrations are expected to happen inside it.
    ///
    /// # Examples
    /// ```rust
    /// use dicon::Container;
    ///
    /// #[derive(Clone)]
    /// struct Port(u16);
    ///
    /// #[derive(Clone)]
    /// struct Address(String);
    ///
    /// let container = Container::new(|cfg| {
    ///     cfg.register(|| Port(8080))
    ///         .register(|Port(port)| Address(format!("127.0.0.1:{port}")));
    /// });
    ///
    /// assert_eq!(container.get::<Address>().0, "127.0.0.1:8080");
    /// ```
    #[must_use]
    pub fn new(configure: impl FnOnce(&Configurator)) -> Self {
        let container = Self {
            inner: Arc::new(ContainerInner::default()),
        };

        configure(&Configurator::new(&container));
        debug!(registered = container.inner.registry.read().len(), "Container configured");

        container
    }

    /// Gets an instance of the capability from the container
    ///
    /// # Notes
    /// - The unit capability `()` is returned immediately without consulting the registry.
    /// - A cached instance is cloned out of the cache. For `Arc` capabilities every call shares the same instance.
    /// - Otherwise the registered factory is called, its arguments are resolved through the container,
    ///   and the result is cached unless the registration is transient.
    ///
    /// # Panics
    /// Panics if resolution fails. A failed resolution is a wiring mistake:
    /// - the capability or one of its transitive dependencies isn't registered,
    /// - the dependencies form a cycle,
    /// - a fallible factory returned an error.
    ///
    /// Use [`Self::try_get`] to get the error instead.
    #[must_use]
    #[track_caller]
    pub fn get<Dep: Capability>(&self) -> Dep {
        match self.try_get() {
            Ok(dependency) => dependency,
            Err(err) => panic!("{err}"),
        }
    }

    /// Gets an instance of the capability from the container.
    /// Same as [`Self::get`], but returns the error instead of panicking.
    ///
    /// # Errors
    /// - Returns [`ResolveErrorKind::NoInstantiator`] if the capability isn't registered
    /// - Returns [`ResolveErrorKind::CyclicDependency`] if the capability depends on itself
    /// - Returns [`ResolveErrorKind::Instantiator`] if one of its dependencies can't be resolved or a fallible factory fails
    pub fn try_get<Dep: Capability>(&self) -> Result<Dep, ResolveErrorKind> {
        if let Some(unit) = (&() as &dyn Any).downcast_ref::<Dep>() {
            return Ok(unit.clone());
        }

        let type_info = TypeInfo::of::<Dep>();

        let span = info_span!("get", dependency = type_info.name);
        let _guard = span.enter();

        let _resolution_guard = self.inner.resolution_lock.lock();

        let cached = self.inner.cache.lock().get::<Dep>(&type_info);
        if let Some(dependency) = cached {
            debug!("Found in cache");
            return Ok(dependency);
        }
        debug!("Not found in cache");

        let (dependency, config) = self.instantiate(type_info)?;
        let dependency = match dependency.downcast::<Dep>() {
            Ok(dependency) => *dependency,
            Err(incorrect_type) => {
                let err = ResolveErrorKind::IncorrectType {
                    expected: type_info,
                    actual: (*incorrect_type).type_id(),
                };
                error!("{}", err);
                return Err(err);
            }
        };

        if config.cache_provides {
            self.inner.cache.lock().insert(dependency.clone());
            debug!("Cached");
        }

        Ok(dependency)
    }

    /// Builds every registered capability, as if each of them was requested.
    ///
    /// Call it once after configuration to surface wiring mistakes at startup instead of at first use.
    /// Every registered non-transient capability is cached afterwards.
    ///
    /// # Panics
    /// Panics with the same error [`Self::get`] would raise for the first capability that can't be built.
    #[track_caller]
    pub fn verify(&self) {
        if let Err(err) = self.try_verify() {
            panic!("{err}");
        }
    }

    /// Same as [`Self::verify`], but returns the error instead of panicking.
    ///
    /// # Errors
    /// Returns the error of the first capability that can't be built, see [`Self::try_get`]
    pub fn try_verify(&self) -> Result<(), ResolveErrorKind> {
        let span = info_span!("verify");
        let _guard = span.enter();

        let _resolution_guard = self.inner.resolution_lock.lock();

        let type_infos = self.inner.registry.read().type_infos();
        for type_info in type_infos {
            if type_info.is_unit() || self.inner.cache.lock().contains(&type_info) {
                continue;
            }

            let (dependency, config) = self.instantiate(type_info)?;
            if config.cache_provides {
                self.inner.cache.lock().insert_boxed(type_info, dependency);
            }
            debug!(dependency = type_info.name, "Verified");
        }

        debug!("Container verified");
        Ok(())
    }

    /// Checks whether a factory is registered for the capability
    #[must_use]
    pub fn is_registered<Dep: ?Sized + 'static>(&self) -> bool {
        self.inner.registry.read().contains(&TypeInfo::of::<Dep>())
    }

    /// Checks whether an instance of the capability is cached
    #[must_use]
    pub fn is_cached<Dep: ?Sized + 'static>(&self) -> bool {
        self.inner.cache.lock().contains(&TypeInfo::of::<Dep>())
    }

    /// Returns the keys of every registered capability
    #[must_use]
    pub fn registered(&self) -> Vec<TypeInfo> {
        self.inner.registry.read().type_infos()
    }
}

impl Container {
    pub(crate) fn add_instantiator(&self, type_info: TypeInfo, instantiator: BoxedCloneInstantiator, config: Config) {
        if self
            .inner
            .registry
            .write()
            .add_instantiator(type_info, instantiator, config)
            .is_some()
        {
            debug!(dependency = type_info.name, "Registration replaced");
        } else {
            debug!(dependency = type_info.name, "Registered");
        }
    }

    /// Calls the factory registered for the capability.
    /// The registry lock isn't held while the factory runs, so the factory can resolve through the container.
    fn instantiate(&self, type_info: TypeInfo) -> Result<(BoxedAny, Config), ResolveErrorKind> {
        let Some(InstantiatorData { mut instantiator, config }) = self.inner.registry.read().get(&type_info) else {
            let err = ResolveErrorKind::NoInstantiator { type_info };
            error!("{}", err);
            return Err(err);
        };

        let _resolution_guard = ResolutionGuard::enter(&self.inner.resolving, type_info)?;

        match instantiator.call(self) {
            Ok(dependency) => Ok((dependency, config)),
            Err(InstantiatorErrorKind::Deps(err)) => {
                error!("{}", err);
                Err(ResolveErrorKind::Instantiator(InstantiatorErrorKind::Deps(Box::new(err))))
            }
            Err(InstantiatorErrorKind::Factory(err)) => {
                error!("{}", err);
                Err(ResolveErrorKind::Instantiator(InstantiatorErrorKind::Factory(err)))
            }
        }
    }
}

#[derive(Default)]
pub(crate) struct ContainerInner {
    pub(crate) registry: RwLock<Registry>,
    pub(crate) cache: Mutex<Cache>,
    pub(crate) resolving: Mutex<ResolutionStack>,
    pub(crate) resolution_lock: ReentrantMutex<()>,
}

impl Drop for ContainerInner {
    fn drop(&mut self) {
        debug!(cached = self.cache.get_mut().len(), "Container dropped");
    }
}
