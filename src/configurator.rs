use crate::{
    any::TypeInfo,
    config::Config,
    dependency_resolver::{Capability, DependencyResolver},
    errors::ResolveErrorKind,
    instantiator::{boxed_container_factory, boxed_factory, boxed_instantiator, Factory, Instantiator},
    Container,
};

/// Registration view of a [`Container`], passed to the callback of [`Container::new`].
///
/// Registering a capability that is already registered replaces the previous factory.
/// A capability already resolved through [`Self::get`] stays cached with its old instance.
pub struct Configurator<'a> {
    container: &'a Container,
}

impl<'a> Configurator<'a> {
    #[inline]
    #[must_use]
    pub(crate) fn new(container: &'a Container) -> Self {
        Self { container }
    }

    /// Registers a factory for the capability it returns.
    ///
    /// The factory takes up to three capabilities as arguments.
    /// They are resolved through the container, left to right, before the factory is called.
    #[inline]
    pub fn register<F, Deps>(&self, factory: F) -> &Self
    where
        F: Factory<Deps> + Send + Sync,
        F::Provides: Capability,
        Deps: DependencyResolver<Error = ResolveErrorKind>,
    {
        self.register_with_config(factory, Config::default())
    }

    #[inline]
    pub fn register_with_config<F, Deps>(&self, factory: F, config: Config) -> &Self
    where
        F: Factory<Deps> + Send + Sync,
        F::Provides: Capability,
        Deps: DependencyResolver<Error = ResolveErrorKind>,
    {
        self.container
            .add_instantiator(TypeInfo::of::<F::Provides>(), boxed_factory(factory), config);
        self
    }

    /// Registers a fallible factory for the capability in its `Ok` variant.
    /// The error is returned by [`Container::try_get`] as [`crate::InstantiatorErrorKind::Factory`].
    #[inline]
    pub fn try_register<Inst, Deps>(&self, instantiator: Inst) -> &Self
    where
        Inst: Instantiator<Deps> + Send + Sync,
        Inst::Provides: Capability,
        Deps: DependencyResolver<Error = ResolveErrorKind>,
    {
        self.try_register_with_config(instantiator, Config::default())
    }

    #[inline]
    pub fn try_register_with_config<Inst, Deps>(&self, instantiator: Inst, config: Config) -> &Self
    where
        Inst: Instantiator<Deps> + Send + Sync,
        Inst::Provides: Capability,
        Deps: DependencyResolver<Error = ResolveErrorKind>,
    {
        self.container
            .add_instantiator(TypeInfo::of::<Inst::Provides>(), boxed_instantiator(instantiator), config);
        self
    }

    /// Registers a factory that resolves its dependencies from the container by itself
    #[inline]
    pub fn register_with<F, Dep>(&self, factory: F) -> &Self
    where
        F: FnMut(&Container) -> Dep + Clone + Send + Sync + 'static,
        Dep: Capability,
    {
        self.container
            .add_instantiator(TypeInfo::of::<Dep>(), boxed_container_factory(factory), Config::default());
        self
    }

    /// Resolves a capability registered so far. See [`Container::get`].
    ///
    /// # Panics
    /// Panics if the capability can't be resolved
    #[must_use]
    #[track_caller]
    pub fn get<Dep: Capability>(&self) -> Dep {
        self.container.get()
    }

    /// See [`Container::try_get`].
    ///
    /// # Errors
    /// Returns the resolution error
    pub fn try_get<Dep: Capability>(&self) -> Result<Dep, ResolveErrorKind> {
        self.container.try_get()
    }
}
