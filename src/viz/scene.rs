use super::{
    controllers::FrameStepInfo,
    node::{CommandBuffersContext, Node, NodeProperties, NodeRef},
};
use crate::error::CloudError;

/// Group of nodes drawn under a common transformation.
#[derive(Clone, Default)]
pub struct Scene {
    properties: NodeProperties,
    pub nodes: Vec<NodeRef<dyn Node>>,
}

impl Scene {
    /// Appends a node and grows the scene bounds to enclose it.
    pub fn add(&mut self, node: NodeRef<dyn Node>) -> &mut Self {
        let node_sphere = *node.borrow().properties().bounding_sphere();
        self.properties.bounding_sphere = self.properties.bounding_sphere.add(&node_sphere);
        self.nodes.push(node);
        self
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl Node for Scene {
    fn properties(&self) -> &NodeProperties {
        &self.properties
    }

    fn properties_mut(&mut self) -> &mut NodeProperties {
        &mut self.properties
    }

    fn collect_command_buffers(
        &self,
        context: &mut CommandBuffersContext,
        frame_info: &FrameStepInfo,
    ) -> Result<(), CloudError> {
        if !self.properties.visible {
            return Ok(());
        }

        // Save the view matrix.
        let saved_view_matrix = context.view_matrix;

        // Transform with this parent node transformation.
        context.view_matrix *= self.properties.transformation;

        // Traverse subnodes:
        let result = self
            .nodes
            .iter()
            .try_for_each(|node| node.borrow().collect_command_buffers(&mut *context, frame_info));

        // Restores the parent view matrix.
        context.view_matrix = saved_view_matrix;
        result
    }
}
