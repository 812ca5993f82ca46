/// COLLADA reader: bound position sources, `<triangles>`/`<polylist>`
/// primitives and effect diffuse colors
use std::collections::HashMap;

use nalgebra::Point3;
use nom::{
    character::complete::{self as chars, multispace0, multispace1},
    combinator::all_consuming,
    multi::separated_list0,
    number::complete::float,
    sequence::delimited,
    IResult,
};
use roxmltree::{Document, Node};
use tracing::{debug, warn};

use super::coords::parse_coordinate_groups;
use crate::error::{RenderError, Result};
use crate::geometry::{Color4, Face, Material, Mesh, Scene, Vertex3};

const POSITION_STRIDE: usize = 3;

pub fn parse_dae(text: &str) -> Result<Scene> {
    let document = Document::parse(text)
        .map_err(|e| RenderError::Import(format!("invalid COLLADA document: {e}")))?;

    let mut palette = Palette::read(&document);
    let mut vertices = Vec::new();
    let mut meshes = Vec::new();

    for geometry in elements(&document, "geometry") {
        let name = geometry
            .attribute("name")
            .or_else(|| geometry.attribute("id"))
            .unwrap_or("geometry");

        for node in geometry.children().filter(|n| n.has_tag_name("mesh")) {
            let Some(positions) = bound_positions(node)? else {
                warn!(geometry = name, "mesh has no bound POSITION source, skipped");
                continue;
            };
            let base = vertices.len();
            let count = positions.len();
            vertices.extend(positions);
            meshes.push(read_primitives(node, name, base, count, &mut palette)?);
        }
    }

    if vertices.is_empty() {
        // Nothing bound: fall back to every float array, one `x y z` group per line
        let points: Vec<Vertex3> = elements(&document, "float_array")
            .filter_map(|n| n.text())
            .flat_map(parse_coordinate_groups)
            .collect();
        debug!(points = points.len(), "read float arrays as coordinate groups");
        return Ok(Scene::new(points, Vec::new(), Vec::new()));
    }

    Ok(Scene::new(vertices, meshes, palette.into_materials()))
}

/// Materials in library order, plus the symbol bindings from instanced geometry
struct Palette {
    materials: Vec<Material>,
    by_id: HashMap<String, usize>,
    bindings: HashMap<String, String>,
    fallback: Option<usize>,
}

impl Palette {
    fn read(document: &Document<'_>) -> Self {
        let effects: HashMap<&str, Color4> = elements(document, "effect")
            .filter_map(|effect| Some((effect.attribute("id")?, effect_diffuse(effect))))
            .collect();

        let mut materials = Vec::new();
        let mut by_id = HashMap::new();
        for material in elements(document, "material") {
            let Some(id) = material.attribute("id") else {
                continue;
            };
            let diffuse = child(material, "instance_effect")
                .and_then(|n| n.attribute("url"))
                .and_then(|url| effects.get(local_ref(url)))
                .copied()
                .unwrap_or_else(|| Material::fallback().diffuse);

            let name = material.attribute("name").unwrap_or(id);
            by_id.insert(id.to_string(), materials.len());
            materials.push(Material::new(name, diffuse));
        }

        let bindings = elements(document, "instance_material")
            .filter_map(|n| {
                let symbol = n.attribute("symbol")?;
                let target = n.attribute("target")?;
                Some((symbol.to_string(), local_ref(target).to_string()))
            })
            .collect();

        Self {
            materials,
            by_id,
            bindings,
            fallback: None,
        }
    }

    /// Index for a primitive's `material` symbol; unknown symbols share one grey material
    fn resolve(&mut self, symbol: Option<&str>) -> usize {
        let found = symbol
            .map(|s| self.bindings.get(s).map_or(s, String::as_str))
            .and_then(|id| self.by_id.get(id))
            .copied();
        if let Some(index) = found {
            return index;
        }

        match self.fallback {
            Some(index) => index,
            None => {
                self.materials.push(Material::fallback());
                let index = self.materials.len() - 1;
                self.fallback = Some(index);
                index
            }
        }
    }

    fn into_materials(mut self) -> Vec<Material> {
        if self.materials.is_empty() {
            self.materials.push(Material::fallback());
        }
        self.materials
    }
}

fn effect_diffuse(effect: Node<'_, '_>) -> Color4 {
    let values = effect
        .descendants()
        .find(|n| n.has_tag_name("diffuse"))
        .and_then(|diffuse| child(diffuse, "color"))
        .and_then(|color| color.text())
        .and_then(|text| parse_floats(text).ok());

    match values.as_deref() {
        Some(&[r, g, b, a]) => Color4::new(a, r, g, b),
        Some(&[r, g, b]) => Color4::opaque(r, g, b),
        // Textured or missing diffuse
        _ => Material::fallback().diffuse,
    }
}

/// Positions of the source the mesh's `<vertices>` binds as POSITION
fn bound_positions(mesh: Node<'_, '_>) -> Result<Option<Vec<Vertex3>>> {
    let source_id = child(mesh, "vertices")
        .and_then(|vertices| input_for(vertices, "POSITION"))
        .and_then(|input| input.attribute("source"))
        .map(local_ref);
    let Some(source) = source_id.and_then(|id| {
        mesh.children()
            .find(|n| n.has_tag_name("source") && n.attribute("id") == Some(id))
    }) else {
        return Ok(None);
    };

    let values = match child(source, "float_array").and_then(|n| n.text()) {
        Some(text) => parse_floats(text)?,
        None => Vec::new(),
    };
    let stride = child(source, "technique_common")
        .and_then(|technique| child(technique, "accessor"))
        .and_then(|accessor| accessor.attribute("stride"))
        .and_then(|stride| stride.parse::<usize>().ok())
        .unwrap_or(POSITION_STRIDE);
    if stride < POSITION_STRIDE {
        return Err(RenderError::Import(format!(
            "position source stride {stride} is below {POSITION_STRIDE}"
        )));
    }

    Ok(Some(
        values
            .chunks_exact(stride)
            .map(|c| Point3::new(c[0], c[1], c[2]))
            .collect(),
    ))
}

fn read_primitives(
    node: Node<'_, '_>,
    name: &str,
    base: usize,
    vertex_count: usize,
    palette: &mut Palette,
) -> Result<Mesh> {
    let mut mesh = Mesh::new(name);
    let mut dropped = 0usize;

    let primitives = node
        .children()
        .filter(|n| n.has_tag_name("triangles") || n.has_tag_name("polylist"));
    for primitive in primitives {
        // Each corner holds one index per input; the VERTEX one picks the position
        let stride = primitive
            .children()
            .filter(|n| n.has_tag_name("input"))
            .filter_map(|n| n.attribute("offset")?.parse::<usize>().ok())
            .max()
            .map_or(1, |offset| offset + 1);
        let vertex_offset = input_for(primitive, "VERTEX")
            .and_then(|n| n.attribute("offset"))
            .and_then(|offset| offset.parse::<usize>().ok())
            .unwrap_or(0);

        let corners: Vec<usize> = match child(primitive, "p").and_then(|p| p.text()) {
            Some(text) => parse_indices(text)?
                .chunks_exact(stride)
                .map(|corner| corner[vertex_offset] as usize)
                .collect(),
            None => Vec::new(),
        };

        let arities: Vec<usize> = if primitive.has_tag_name("polylist") {
            match child(primitive, "vcount").and_then(|n| n.text()) {
                Some(text) => parse_indices(text)?.into_iter().map(|n| n as usize).collect(),
                None => Vec::new(),
            }
        } else {
            vec![3; corners.len() / 3]
        };

        let material_index = palette.resolve(primitive.attribute("material"));
        let mut start = 0;
        for arity in arities {
            let Some(polygon) = corners.get(start..start + arity) else {
                break;
            };
            start += arity;

            if polygon.iter().any(|&i| i >= vertex_count) {
                dropped += 1;
                continue;
            }
            let indices = polygon.iter().map(|&i| base + i).collect();
            mesh.add_face(Face::new(material_index, indices));
        }
    }

    if dropped > 0 {
        warn!(geometry = name, dropped, "faces referencing missing positions were dropped");
    }
    Ok(mesh)
}

fn elements<'a, 'input>(
    document: &'a Document<'input>,
    tag: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    document.descendants().filter(move |n| n.has_tag_name(tag))
}

fn child<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| n.has_tag_name(tag))
}

fn input_for<'a, 'input>(node: Node<'a, 'input>, semantic: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|n| n.has_tag_name("input") && n.attribute("semantic") == Some(semantic))
}

/// `#id` references point into the same document
fn local_ref(url: &str) -> &str {
    url.trim_start_matches('#')
}

fn parse_floats(text: &str) -> Result<Vec<f32>> {
    float_list(text).map(|(_, values)| values).map_err(|e| {
        RenderError::Import(format!("malformed float list: {:?}", e.map(|e| e.code)))
    })
}

fn parse_indices(text: &str) -> Result<Vec<u32>> {
    index_list(text).map(|(_, values)| values).map_err(|e| {
        RenderError::Import(format!("malformed index list: {:?}", e.map(|e| e.code)))
    })
}

fn float_list(input: &str) -> IResult<&str, Vec<f32>> {
    all_consuming(delimited(
        multispace0,
        separated_list0(multispace1, float),
        multispace0,
    ))(input)
}

fn index_list(input: &str) -> IResult<&str, Vec<u32>> {
    all_consuming(delimited(
        multispace0,
        separated_list0(multispace1, chars::u32),
        multispace0,
    ))(input)
}
