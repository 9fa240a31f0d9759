//! Platform event translation.

mod winit;

pub(crate) use self::winit::EventTranslator;
