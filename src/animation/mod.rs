pub(crate) mod ease;
pub(crate) mod motion;
pub(crate) mod track;
