pub mod execution_provider;
pub mod missing_model_detector;
pub mod model_resolver;
pub mod onnx_blazeface_detector;
