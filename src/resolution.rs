use alloc::vec::Vec;
use parking_lot::Mutex;
use tracing::error;

use crate::{any::TypeInfo, errors::ResolveErrorKind};

/// Capabilities whose factories are running, outermost first.
#[derive(Default)]
pub(crate) struct ResolutionStack(Vec<TypeInfo>);

impl ResolutionStack {
    fn push(&mut self, type_info: TypeInfo) -> Result<(), ResolveErrorKind> {
        if let Some(position) = self.0.iter().position(|resolving| *resolving == type_info) {
            let mut chain = Vec::with_capacity(self.0.len() - position + 1);
            chain.extend_from_slice(&self.0[position..]);
            chain.push(type_info);

            return Err(ResolveErrorKind::CyclicDependency {
                chain: chain.into_boxed_slice(),
            });
        }

        self.0.push(type_info);
        Ok(())
    }

    fn pop(&mut self) {
        self.0.pop();
    }

    #[cfg(test)]
    #[must_use]
    pub(crate) fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Keeps the capability on the resolution stack while its factory runs, popping it on drop even if the factory panics.
pub(crate) struct ResolutionGuard<'a> {
    stack: &'a Mutex<ResolutionStack>,
}

impl<'a> ResolutionGuard<'a> {
    pub(crate) fn enter(stack: &'a Mutex<ResolutionStack>, type_info: TypeInfo) -> Result<Self, ResolveErrorKind> {
        if let Err(err) = stack.lock().push(type_info) {
            error!("{}", err);
            return Err(err);
        }
        Ok(Self { stack })
    }
}

impl Drop for ResolutionGuard<'_> {
    fn drop(&mut self) {
        self.stack.lock().pop();
    }
}
