pub mod svg;
pub mod template_loader;
