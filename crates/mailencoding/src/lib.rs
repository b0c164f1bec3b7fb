mod addresses;
mod encoder;
mod encoding;
mod error;
mod headermap;
mod mediatype;
mod part;
mod rfc2047;
mod strings;

pub use error::MailEncodingError;
pub type Result<T> = std::result::Result<T, MailEncodingError>;

pub use addresses::*;
pub use encoder::*;
pub use encoding::*;
pub use headermap::*;
pub use part::*;
pub use rfc2047::*;
pub use strings::to_ascii;
