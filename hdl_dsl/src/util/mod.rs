pub mod arena;
pub mod data;

#[macro_export]
macro_rules! throw {
    ($e:expr) => {
        return Err($e.into())
    };
}
