use std::cmp::Reverse;
use std::collections::HashMap;

use tracing::debug;

use regscope_types::{Image, ImageStream, ProjectUsage};

/// Cluster-wide lookup from image name to image record
#[derive(Clone, Debug, Default)]
pub struct ImageIndex {
    images: HashMap<String, Image>,
}

impl ImageIndex {
    /// Index images by name; a later record with the same name replaces an
    /// earlier one
    pub fn new(images: Vec<Image>) -> Self {
        images.into_iter().collect()
    }

    /// Best-effort lookup of a tag item's image reference
    pub fn resolve<'a>(&'a self, id: Option<&'a str>) -> Resolved<'a> {
        let id = id.unwrap_or_default();
        match self.images.get(id) {
            Some(image) => Resolved::Found(image),
            None => Resolved::Missing(id),
        }
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

impl FromIterator<Image> for ImageIndex {
    fn from_iter<I: IntoIterator<Item = Image>>(iter: I) -> Self {
        Self {
            images: iter
                .into_iter()
                .map(|image| (image.metadata.name.clone(), image))
                .collect(),
        }
    }
}

/// Outcome of joining a tag item to the image index
#[derive(Clone, Copy, Debug)]
pub enum Resolved<'a> {
    Found(&'a Image),
    /// Image id not present in the index (empty when the tag item had none).
    /// Contributes no layers.
    Missing(&'a str),
}

impl<'a> Resolved<'a> {
    pub fn image(&self) -> Option<&'a Image> {
        match self {
            Self::Found(image) => Some(image),
            Self::Missing(_) => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing(_))
    }
}

/// Computes per-project usage against one image index and registry address
pub struct UsageAggregator<'a> {
    index: &'a ImageIndex,
    registry: String,
}

impl<'a> UsageAggregator<'a> {
    pub fn new(index: &'a ImageIndex, registry: impl Into<String>) -> Self {
        Self {
            index,
            registry: registry.into(),
        }
    }

    pub fn registry(&self) -> &str {
        &self.registry
    }

    /// Every tag item of every stream, joined to the index, in stream order
    pub fn resolve_streams<'s>(&'s self, streams: &'s [ImageStream]) -> Vec<Resolved<'s>> {
        streams
            .iter()
            .flat_map(|stream| stream.tags())
            .flat_map(|tag| tag.items())
            .map(|item| self.index.resolve(item.image.as_deref()))
            .collect()
    }

    /// Usage of one project.
    ///
    /// Only images whose reference starts with the registry address count.
    /// Layers are keyed by name, so a layer shared by several images counts
    /// once, with the size from the last image that lists it.
    pub fn project_usage(&self, project: &str, streams: &[ImageStream]) -> ProjectUsage {
        let resolved = self.resolve_streams(streams);

        let mut layers: HashMap<&str, u64> = HashMap::new();
        for image in resolved
            .iter()
            .filter_map(Resolved::image)
            .filter(|image| image.reference().starts_with(&self.registry))
        {
            for layer in image.layers() {
                layers.insert(&layer.name, layer.size);
            }
        }

        let missing = resolved.iter().filter(|r| r.is_missing()).count();
        if missing > 0 {
            debug!(project, missing, "tag items reference images not in the index");
        }

        ProjectUsage::new(project, layers.values().sum(), resolved.len())
    }
}

/// Projects with non-zero usage, largest first. Ties keep input order.
pub fn rank(usages: &[ProjectUsage]) -> Vec<&ProjectUsage> {
    let mut ranked: Vec<&ProjectUsage> = usages.iter().filter(|u| u.usage > 0).collect();
    ranked.sort_by_key(|u| Reverse(u.usage));
    ranked
}

pub fn total_usage(usages: &[ProjectUsage]) -> u64 {
    usages.iter().map(|u| u.usage).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    const REGISTRY: &str = "172.30.1.1:5000";

    fn internal(name: &str) -> Image {
        Image::new(name, format!("{}/shop/{}@{}", REGISTRY, "web", name))
    }

    #[test]
    fn test_no_image_streams() {
        let index = ImageIndex::default();
        let aggregator = UsageAggregator::new(&index, REGISTRY);
        assert_eq!(
            aggregator.project_usage("empty", &[]),
            ProjectUsage::new("empty", 0, 0)
        );
    }

    #[test]
    fn test_duplicate_layer_names_last_size_wins() {
        let index = ImageIndex::new(vec![
            internal("a").with_layer("L1", 10),
            internal("b").with_layer("L1", 20).with_layer("L2", 5),
        ]);
        let streams = vec![ImageStream::new("web", "shop").with_tag("latest", ["a", "b"])];

        let usage = UsageAggregator::new(&index, REGISTRY).project_usage("shop", &streams);
        assert_eq!(usage.usage, 25);
        assert_eq!(usage.image_count, 2);
    }

    #[test]
    fn test_shared_layer_across_streams_counted_once() {
        let index = ImageIndex::new(vec![
            internal("a").with_layer("base", 100).with_layer("app", 7),
            internal("b").with_layer("base", 100).with_layer("worker", 3),
        ]);
        let streams = vec![
            ImageStream::new("web", "shop").with_tag("latest", ["a"]),
            ImageStream::new("worker", "shop").with_tag("latest", ["b"]),
        ];

        let usage = UsageAggregator::new(&index, REGISTRY).project_usage("shop", &streams);
        assert_eq!(usage.usage, 110);
    }

    #[test]
    fn test_external_registry_excluded() {
        let index = ImageIndex::new(vec![
            Image::new("ext", "other-registry/img").with_layer("L1", 500),
            internal("int").with_layer("L2", 5),
        ]);
        let streams = vec![ImageStream::new("web", "shop").with_tag("latest", ["ext", "int"])];

        let usage = UsageAggregator::new(&index, REGISTRY).project_usage("shop", &streams);
        assert_eq!(usage.usage, 5);
        // Counted before the registry filter
        assert_eq!(usage.image_count, 2);
    }

    #[test]
    fn test_missing_image_is_counted_without_layers() {
        let index = ImageIndex::new(vec![internal("a").with_layer("L1", 10)]);
        let streams = vec![ImageStream::new("web", "shop").with_tag("latest", ["gone", "a"])];
        let aggregator = UsageAggregator::new(&index, REGISTRY);

        let resolved = aggregator.resolve_streams(&streams);
        assert!(matches!(resolved[0], Resolved::Missing("gone")));
        assert!(resolved[1].image().is_some());

        let usage = aggregator.project_usage("shop", &streams);
        assert_eq!(usage, ProjectUsage::new("shop", 10, 2));
    }

    #[test]
    fn test_tag_item_without_image_id() {
        let index = ImageIndex::default();
        let streams: Vec<ImageStream> = vec![serde_json::from_str(
            r#"{"metadata":{"name":"web"},"status":{"tags":[{"tag":"latest","items":[{}]}]}}"#,
        )
        .unwrap()];

        let aggregator = UsageAggregator::new(&index, REGISTRY);
        let resolved = aggregator.resolve_streams(&streams);
        assert!(matches!(resolved[0], Resolved::Missing("")));
        assert_eq!(aggregator.project_usage("shop", &streams).image_count, 1);
    }

    #[test]
    fn test_index_later_duplicate_wins() {
        let index = ImageIndex::new(vec![
            internal("a").with_layer("L1", 1),
            internal("a").with_layer("L1", 2),
        ]);
        assert_eq!(index.len(), 1);
        assert_eq!(index.resolve(Some("a")).image().unwrap().layers()[0].size, 2);
    }

    #[test]
    fn test_rank_and_total() {
        let usages = vec![
            ProjectUsage::new("A", 100, 1),
            ProjectUsage::new("B", 0, 0),
            ProjectUsage::new("C", 50, 1),
        ];

        let ranked: Vec<&str> = rank(&usages).iter().map(|u| u.project.as_str()).collect();
        assert_eq!(ranked, vec!["A", "C"]);
        assert_eq!(total_usage(&usages), 150);
    }

    #[test]
    fn test_rank_ties_keep_project_order() {
        let usages = vec![
            ProjectUsage::new("first", 10, 1),
            ProjectUsage::new("second", 10, 1),
            ProjectUsage::new("big", 30, 1),
        ];
        let ranked: Vec<&str> = rank(&usages).iter().map(|u| u.project.as_str()).collect();
        assert_eq!(ranked, vec!["big", "first", "second"]);
    }
}
