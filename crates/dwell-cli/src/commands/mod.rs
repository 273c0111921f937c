pub mod analyze;
pub mod dispatch;
pub mod io;
pub mod materials;
pub mod refine;
pub mod render;
pub mod schema;
pub mod studio;
