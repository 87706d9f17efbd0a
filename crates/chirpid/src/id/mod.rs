mod machine;
mod parsed;
mod snowflake;

pub use machine::*;
pub use parsed::*;
pub use snowflake::*;
