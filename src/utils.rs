/// Axis-aligned bounding boxes, IoU and frame clamping
pub mod bbox;
