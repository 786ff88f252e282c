use alloc::{boxed::Box, collections::BTreeMap};

use crate::{any::TypeInfo, dependency_resolver::Capability, instantiator::BoxedAny};

#[derive(Default)]
pub(crate) struct Cache {
    map: BTreeMap<TypeInfo, BoxedAny>,
}

impl Cache {
    #[inline]
    #[must_use]
    pub(crate) fn get<T: Capability>(&self, type_info: &TypeInfo) -> Option<T> {
        self.map.get(type_info).and_then(|boxed| boxed.downcast_ref::<T>()).cloned()
    }

    #[inline]
    #[must_use]
    pub(crate) fn contains(&self, type_info: &TypeInfo) -> bool {
        self.map.contains_key(type_info)
    }

    #[inline]
    pub(crate) fn insert<T: Capability>(&mut self, value: T) -> Option<BoxedAny> {
        self.insert_boxed(TypeInfo::of::<T>(), Box::new(value))
    }

    #[inline]
    pub(crate) fn insert_boxed(&mut self, type_info: TypeInfo, value: BoxedAny) -> Option<BoxedAny> {
        self.map.insert(type_info, value)
    }

    #[inline]
    #[must_use]
    pub(crate) fn len(&self) -> usize {
        self.map.len()
    }
}

#[cfg(test)]
mod tests {
    use super::Cache;
    use crate::any::TypeInfo;

    use alloc::{boxed::Box, sync::Arc};

    #[test]
    fn test_get_clones_shared_instance() {
        let mut cache = Cache::default();
        let value = Arc::new(5u8);
        cache.insert(value.clone());

        let cached = cache.get::<Arc<u8>>(&TypeInfo::of::<Arc<u8>>()).unwrap();

        assert!(Arc::ptr_eq(&cached, &value));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_get_with_other_type() {
        let mut cache = Cache::default();
        cache.insert_boxed(TypeInfo::of::<u8>(), Box::new(5u16));

        assert!(cache.contains(&TypeInfo::of::<u8>()));
        assert!(cache.get::<u8>(&TypeInfo::of::<u8>()).is_none());
        assert!(cache.get::<u16>(&TypeInfo::of::<u16>()).is_none());
    }
}
