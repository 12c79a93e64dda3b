mod model_loader;

pub use model_loader::ModelLoader;
