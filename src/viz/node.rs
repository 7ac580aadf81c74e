use std::{cell::RefCell, collections::HashMap, rc::Rc, sync::Arc};

use vulkano::{
    buffer::allocator::SubbufferAllocator,
    command_buffer::{AutoCommandBufferBuilder, PrimaryAutoCommandBuffer},
    descriptor_set::allocator::StandardDescriptorSetAllocator,
    device::Device,
    pipeline::GraphicsPipeline,
    render_pass::RenderPass,
};

use crate::{bounds::Sphere3Df, error::CloudError};

use super::{controllers::FrameStepInfo, Manager};

pub type Mat4x4 = nalgebra_glm::Mat4x4;

pub type NodeRef<T> = Rc<RefCell<T>>;

pub fn node_ref<T>(node: T) -> NodeRef<T> {
    Rc::new(RefCell::new(node))
}

/// State shared by the nodes while recording one frame.
pub struct CommandBuffersContext<'a> {
    pub device: Arc<Device>,
    pub builder: &'a mut AutoCommandBufferBuilder<PrimaryAutoCommandBuffer>,
    pub pipelines: &'a mut HashMap<String, Arc<GraphicsPipeline>>,
    pub render_pass: Arc<RenderPass>,
    pub uniform_allocator: &'a SubbufferAllocator,
    pub descriptor_set_allocator: &'a StandardDescriptorSetAllocator,
    pub view_matrix: nalgebra_glm::Mat4,
    pub projection_matrix: nalgebra_glm::Mat4,
}

pub trait Node {
    fn properties(&self) -> &NodeProperties;
    fn properties_mut(&mut self) -> &mut NodeProperties;
    fn collect_command_buffers(
        &self,
        context: &mut CommandBuffersContext,
        frame_info: &FrameStepInfo,
    ) -> Result<(), CloudError>;
}

/// Conversion of CPU geometry into a drawable node.
pub trait MakeNode {
    type Node: Node;

    fn make_node(&self, manager: &Manager) -> Result<NodeRef<Self::Node>, CloudError>;
}

#[derive(Clone, Copy)]
pub struct NodeProperties {
    pub transformation: Mat4x4,
    pub bounding_sphere: Sphere3Df,
    pub visible: bool,
}

impl Default for NodeProperties {
    fn default() -> Self {
        Self {
            transformation: Mat4x4::identity(),
            bounding_sphere: Sphere3Df::empty(),
            visible: true,
        }
    }
}

impl NodeProperties {
    pub fn transformation(&self) -> &Mat4x4 {
        &self.transformation
    }

    pub fn bounding_sphere(&self) -> &Sphere3Df {
        &self.bounding_sphere
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }
}

#[cfg(test)]
mod tests {
    use super::NodeProperties;

    #[test]
    fn test_basic_behavior() {
        let mut node = NodeProperties::default();
        assert!(node.bounding_sphere().is_empty());
        assert!(node.visible);
        assert_eq!(*node.transformation(), super::Mat4x4::identity());

        node.set_visible(false);
        assert!(!node.visible);
    }
}
