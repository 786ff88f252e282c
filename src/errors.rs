mod instantiate;
mod instantiator;
mod resolve;

pub use instantiate::InstantiateErrorKind;
pub use instantiator::InstantiatorErrorKind;
pub use resolve::ResolveErrorKind;
