pub(crate) mod StructDebug;
mod proxy;
