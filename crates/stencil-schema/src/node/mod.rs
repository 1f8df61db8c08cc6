mod class;
mod directive;
mod field;
mod method;

pub use self::class::*;
pub use self::directive::*;
pub use self::field::*;
pub use self::method::*;
