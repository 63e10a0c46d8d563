pub(crate) mod ask;
pub(crate) mod chat;
pub(crate) mod reset;
pub(crate) mod serve;
