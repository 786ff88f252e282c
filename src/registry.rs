use alloc::{collections::BTreeMap, vec::Vec};

use crate::{any::TypeInfo, config::Config, instantiator::BoxedCloneInstantiator};

#[derive(Clone)]
pub(crate) struct InstantiatorData {
    pub(crate) instantiator: BoxedCloneInstantiator,
    pub(crate) config: Config,
}

#[derive(Default)]
pub(crate) struct Registry {
    instantiators: BTreeMap<TypeInfo, InstantiatorData>,
}

impl Registry {
    /// Registers the instantiator under the key, returning the replaced registration if any
    #[inline]
    pub(crate) fn add_instantiator(
        &mut self,
        type_info: TypeInfo,
        instantiator: BoxedCloneInstantiator,
        config: Config,
    ) -> Option<InstantiatorData> {
        self.instantiators.insert(type_info, InstantiatorData { instantiator, config })
    }

    #[inline]
    #[must_use]
    pub(crate) fn get(&self, type_info: &TypeInfo) -> Option<InstantiatorData> {
        self.instantiators.get(type_info).cloned()
    }

    #[inline]
    #[must_use]
    pub(crate) fn contains(&self, type_info: &TypeInfo) -> bool {
        self.instantiators.contains_key(type_info)
    }

    #[inline]
    #[must_use]
    pub(crate) fn type_infos(&self) -> Vec<TypeInfo> {
        self.instantiators.keys().copied().collect()
    }

    #[inline]
    #[must_use]
    pub(crate) fn len(&self) -> usize {
        self.instantiators.len()
    }
}
