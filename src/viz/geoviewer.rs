use std::{cell::RefCell, rc::Rc};

use winit::event::VirtualKeyCode;

use crate::{error::CloudError, pointcloud::PointCloud, settings::ViewerSettings};

use super::{
    geometry::VkPointCloudNode,
    node::{node_ref, MakeNode, Node, NodeRef},
    scene::Scene,
    Manager, Window,
};

/// Interactive viewer of point clouds. Keys 1 to 9 toggle the first nine clouds, 0 the tenth.
pub struct GeoViewer {
    scene: Rc<RefCell<Scene>>,
    manager: Manager,
    settings: ViewerSettings,
}

impl GeoViewer {
    pub fn new(settings: ViewerSettings) -> Result<Self, CloudError> {
        settings.validate()?;
        Ok(Self {
            scene: node_ref(Scene::default()),
            manager: Manager::new()?,
            settings,
        })
    }

    pub fn add_point_cloud(
        &mut self,
        point_cloud: &PointCloud,
    ) -> Result<NodeRef<VkPointCloudNode>, CloudError> {
        let node = point_cloud.make_node(&self.manager)?;
        node.borrow_mut().apply_settings(&self.settings);
        self.scene.borrow_mut().add(node.clone());
        Ok(node)
    }

    /// Blocks until the window is closed.
    pub fn run(mut self) -> Result<(), CloudError> {
        let mut window = Window::create(&mut self.manager, self.scene.clone(), &self.settings)?;

        let scene = self.scene.clone();
        window.on_key = Some(Box::new(move |vkeycode, _frame_info| {
            let node = node_index(vkeycode)
                .and_then(|index| scene.borrow().nodes.get(index).cloned());
            if let Some(node) = node {
                let mut node = node.borrow_mut();
                let is_visible = node.properties().visible;
                node.properties_mut().set_visible(!is_visible);
                log::debug!("Node visibility set to {}", !is_visible);
            }
        }));
        window.show()
    }
}

fn node_index(vkeycode: VirtualKeyCode) -> Option<usize> {
    let index = match vkeycode {
        VirtualKeyCode::Key1 => 0,
        VirtualKeyCode::Key2 => 1,
        VirtualKeyCode::Key3 => 2,
        VirtualKeyCode::Key4 => 3,
        VirtualKeyCode::Key5 => 4,
        VirtualKeyCode::Key6 => 5,
        VirtualKeyCode::Key7 => 6,
        VirtualKeyCode::Key8 => 7,
        VirtualKeyCode::Key9 => 8,
        VirtualKeyCode::Key0 => 9,
        _ => return None,
    };
    Some(index)
}

/// Shows `point_clouds` in one window and waits for it to be closed.
pub fn draw_geometries(
    point_clouds: &[PointCloud],
    settings: ViewerSettings,
) -> Result<(), CloudError> {
    let mut viewer = GeoViewer::new(settings)?;
    for point_cloud in point_clouds {
        viewer.add_point_cloud(point_cloud)?;
    }
    log::info!(
        "Showing {} point cloud(s) with {} points",
        point_clouds.len(),
        point_clouds.iter().map(PointCloud::len).sum::<usize>()
    );
    viewer.run()
}

#[cfg(test)]
mod tests {
    use winit::event::VirtualKeyCode;

    use super::node_index;

    #[test]
    fn test_number_keys_select_nodes() {
        assert_eq!(node_index(VirtualKeyCode::Key1), Some(0));
        assert_eq!(node_index(VirtualKeyCode::Key9), Some(8));
        assert_eq!(node_index(VirtualKeyCode::Key0), Some(9));
        assert_eq!(node_index(VirtualKeyCode::W), None);
    }
}
