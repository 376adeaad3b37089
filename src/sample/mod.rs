pub(crate) mod fingerprint;
pub(crate) mod session;
pub(crate) mod sink;
