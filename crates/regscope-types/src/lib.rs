//! Shared types for regscope
//!
//! This crate contains the OpenShift records read from `oc get ... -o json`
//! and the derived usage figures shared by the other regscope crates.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Cluster Resource Types
// ============================================================================

/// Resource types queried through the inventory command
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Projects,
    ImageStreams,
    Images,
    Services,
}

impl ResourceKind {
    /// Name passed to `oc get`
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Projects => "projects",
            Self::ImageStreams => "imagestreams",
            Self::Images => "images",
            Self::Services => "services",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Subset of object metadata regscope cares about
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct ObjectMeta {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

impl ObjectMeta {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
        }
    }
}

/// Project (namespace) information
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Project {
    #[serde(default)]
    pub metadata: ObjectMeta,
}

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            metadata: ObjectMeta::named(name),
        }
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }
}

/// Image stream within a project
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ImageStream {
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub status: Option<ImageStreamStatus>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct ImageStreamStatus {
    #[serde(default)]
    pub tags: Option<Vec<Tag>>,
}

impl ImageStream {
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            metadata: ObjectMeta {
                name: name.into(),
                namespace: Some(namespace.into()),
            },
            status: None,
        }
    }

    /// Append a tag whose history points at the given image names
    pub fn with_tag<I, S>(mut self, tag: impl Into<String>, images: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tag = Tag {
            tag: tag.into(),
            items: Some(images.into_iter().map(TagItem::for_image).collect()),
        };
        self.status
            .get_or_insert_with(ImageStreamStatus::default)
            .tags
            .get_or_insert_with(Vec::new)
            .push(tag);
        self
    }

    /// Tags in status order (empty when the stream has no status yet)
    pub fn tags(&self) -> &[Tag] {
        self.status
            .as_ref()
            .and_then(|s| s.tags.as_deref())
            .unwrap_or_default()
    }
}

/// A named tag and its history of images
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Tag {
    #[serde(default)]
    pub tag: String,
    #[serde(default)]
    pub items: Option<Vec<TagItem>>,
}

impl Tag {
    pub fn items(&self) -> &[TagItem] {
        self.items.as_deref().unwrap_or_default()
    }
}

/// One entry in a tag's history
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagItem {
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docker_image_reference: Option<String>,
}

impl TagItem {
    pub fn for_image(image: impl Into<String>) -> Self {
        Self {
            image: Some(image.into()),
            docker_image_reference: None,
        }
    }
}

/// Cluster-wide image record
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub docker_image_reference: Option<String>,
    #[serde(default)]
    pub docker_image_layers: Option<Vec<Layer>>,
}

impl Image {
    pub fn new(name: impl Into<String>, reference: impl Into<String>) -> Self {
        Self {
            metadata: ObjectMeta::named(name),
            docker_image_reference: Some(reference.into()),
            docker_image_layers: None,
        }
    }

    pub fn with_layer(mut self, name: impl Into<String>, size: u64) -> Self {
        self.docker_image_layers
            .get_or_insert_with(Vec::new)
            .push(Layer::new(name, size));
        self
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// Pull spec, or an empty string when the record has none
    pub fn reference(&self) -> &str {
        self.docker_image_reference.as_deref().unwrap_or_default()
    }

    pub fn layers(&self) -> &[Layer] {
        self.docker_image_layers.as_deref().unwrap_or_default()
    }
}

/// Content-addressed layer of an image
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Layer {
    pub name: String,
    #[serde(default)]
    pub size: u64,
}

impl Layer {
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
        }
    }
}

/// Service record, only read to discover the registry address
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Service {
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: Option<ServiceSpec>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct ServiceSpec {
    #[serde(default, rename = "clusterIP")]
    pub cluster_ip: Option<String>,
    #[serde(default)]
    pub ports: Option<Vec<ServicePort>>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ServicePort {
    pub port: u16,
}

impl Service {
    /// `clusterIP:port` of the first declared port
    pub fn address(&self) -> Option<String> {
        let spec = self.spec.as_ref()?;
        let ip = spec.cluster_ip.as_deref().filter(|ip| !ip.is_empty())?;
        let port = spec.ports.as_ref()?.first()?.port;
        Some(format!("{}:{}", ip, port))
    }
}

// ============================================================================
// Usage Types
// ============================================================================

/// Registry usage computed for one project
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ProjectUsage {
    pub project: String,
    /// Bytes held by the distinct layers of the project's registry images
    pub usage: u64,
    /// Tag items seen, before the registry filter
    pub image_count: usize,
}

impl ProjectUsage {
    pub fn new(project: impl Into<String>, usage: u64, image_count: usize) -> Self {
        Self {
            project: project.into(),
            usage,
            image_count,
        }
    }
}
