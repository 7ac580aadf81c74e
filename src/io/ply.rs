use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use ndarray::{Array2, Axis};
use ply_rs::parser::Parser;
use ply_rs::ply::{
    self, Addable, DefaultElement, ElementDef, Encoding, Ply, Property, PropertyDef,
    PropertyType, ScalarType,
};
use ply_rs::writer::Writer;

use crate::error::CloudError;
use crate::pointcloud::PointCloud;

struct Vertex {
    point: [f32; 3],
    color: [u8; 3],
}

impl ply::PropertyAccess for Vertex {
    fn new() -> Self {
        Vertex {
            point: [0f32; 3],
            color: [0u8; 3],
        }
    }

    fn set_property(&mut self, key: String, property: Property) {
        match (key.as_ref(), property) {
            ("x", Property::Float(v)) => self.point[0] = v,
            ("y", Property::Float(v)) => self.point[1] = v,
            ("z", Property::Float(v)) => self.point[2] = v,
            ("x", Property::Double(v)) => self.point[0] = v as f32,
            ("y", Property::Double(v)) => self.point[1] = v as f32,
            ("z", Property::Double(v)) => self.point[2] = v as f32,
            ("red", Property::UChar(v)) => self.color[0] = v,
            ("green", Property::UChar(v)) => self.color[1] = v,
            ("blue", Property::UChar(v)) => self.color[2] = v,
            (_, _) => (),
        }
    }
}

/// Reads the vertex element of a PLY file into a point cloud.
/// Colors are loaded when the vertices carry `red`, `green` and `blue`.
pub fn read_ply<P>(filepath: P) -> Result<PointCloud, CloudError>
where
    P: AsRef<Path>,
{
    let mut f = BufReader::new(File::open(filepath)?);

    let vertex_parser = Parser::<Vertex>::new();
    let header = vertex_parser.read_header(&mut f)?;

    let mut point_cloud = None;
    for (_ignore_key, element) in &header.elements {
        match element.name.as_ref() {
            "vertex" => {
                let vertex_vec = vertex_parser.read_payload_for_element(&mut f, element, &header)?;
                let points = Array2::<f32>::from_shape_fn((vertex_vec.len(), 3), |(i, c)| {
                    vertex_vec[i].point[c]
                });
                let mut pcl = PointCloud::from_points(points)?;

                if ["red", "green", "blue"]
                    .iter()
                    .all(|k| element.properties.contains_key(*k))
                {
                    pcl = pcl.with_colors(Array2::<u8>::from_shape_fn(
                        (vertex_vec.len(), 3),
                        |(i, c)| vertex_vec[i].color[c],
                    ))?;
                }
                point_cloud = Some(pcl);
            }
            other => {
                log::warn!("Skipping PLY element {} with {} entries", other, element.count);
                Parser::<DefaultElement>::new().read_payload_for_element(&mut f, element, &header)?;
            }
        }
    }

    point_cloud.ok_or_else(|| CloudError::Parser("PLY file has no vertex element".to_string()))
}

/// Writes the point cloud as an ASCII PLY file.
pub fn write_ply<P>(filepath: P, pcl: &PointCloud) -> Result<(), CloudError>
where
    P: AsRef<Path>,
{
    let mut ply = {
        let mut ply = Ply::<DefaultElement>::new();
        let mut vertex_element = ElementDef::new("vertex".to_string());
        ["x", "y", "z"].iter().for_each(|key| {
            vertex_element.properties.add(PropertyDef::new(
                key.to_string(),
                PropertyType::Scalar(ScalarType::Float),
            ));
        });

        let mut vertex_array: Vec<DefaultElement> = pcl
            .points
            .axis_iter(Axis(0))
            .map(|point| {
                let mut elem = DefaultElement::new();
                elem.insert("x".to_string(), Property::Float(point[0]));
                elem.insert("y".to_string(), Property::Float(point[1]));
                elem.insert("z".to_string(), Property::Float(point[2]));
                elem
            })
            .collect();

        if let Some(colors) = &pcl.colors {
            ["red", "green", "blue"].iter().for_each(|key| {
                vertex_element.properties.add(PropertyDef::new(
                    key.to_string(),
                    PropertyType::Scalar(ScalarType::UChar),
                ));
            });

            colors
                .axis_iter(Axis(0))
                .zip(vertex_array.iter_mut())
                .for_each(|(color, elem)| {
                    elem.insert("red".to_string(), Property::UChar(color[0]));
                    elem.insert("green".to_string(), Property::UChar(color[1]));
                    elem.insert("blue".to_string(), Property::UChar(color[2]));
                });
        }

        ply.header.elements.add(vertex_element);
        ply.payload.insert("vertex".to_string(), vertex_array);
        ply.make_consistent()
            .map_err(|err| CloudError::Parser(format!("{:?}", err)))?;
        ply
    };

    ply.header.encoding = Encoding::Ascii;

    let mut buf = BufWriter::new(File::create(filepath)?);
    Writer::new().write_ply(&mut buf, &mut ply)?;
    log::debug!("Wrote {} points", pcl.len());

    Ok(())
}

#[cfg(test)]
mod test {
    use std::io::Write;

    use approx::assert_abs_diff_eq;
    use ndarray::array;

    use super::{read_ply, write_ply};
    use crate::error::CloudError;
    use crate::pointcloud::PointCloud;

    #[test]
    fn should_read_back_what_was_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cloud.ply");

        let pcl = PointCloud::from_points(array![[0.25, 0.5, 0.75], [0.0, 0.125, 0.999]])
            .unwrap()
            .with_colors(array![[255, 0, 0], [0, 10, 20]])
            .unwrap();
        write_ply(&path, &pcl).unwrap();

        let loaded = read_ply(&path).unwrap();
        assert_eq!(loaded.len(), 2);
        for (a, b) in loaded.points.iter().zip(pcl.points.iter()) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-6);
        }
        assert_eq!(loaded.colors, pcl.colors);
    }

    #[test]
    fn should_skip_colors_when_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.ply");
        write_ply(&path, &PointCloud::zeros(5)).unwrap();

        let loaded = read_ply(&path).unwrap();
        assert_eq!(loaded.len(), 5);
        assert!(loaded.colors.is_none());
    }

    #[test]
    fn should_skip_faces() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mesh.ply");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(
            file,
            "ply\nformat ascii 1.0\nelement vertex 3\nproperty float x\nproperty float y\n\
             property float z\nelement face 1\nproperty list uchar int vertex_indices\n\
             end_header\n0 0 0\n1 0 0\n0 1 0\n3 0 1 2\n"
        )
        .unwrap();
        drop(file);

        let loaded = read_ply(&path).unwrap();
        assert_eq!(loaded.len(), 3);
        assert_eq!(loaded.points[[1, 0]], 1.0);
    }

    #[test]
    fn should_fail_on_missing_file() {
        let result = read_ply("does/not/exist.ply");
        assert!(matches!(result, Err(CloudError::Io(_))));
    }
}
