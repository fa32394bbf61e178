//! Layer descriptors, async source loading, and the loaded-layer registry.
//!
//! A host describes each layer with a [`LayerDescriptor`]: a unique name, a
//! raster source that is either ready or still resolving, a parallax speed,
//! and an optional render hook. [`LayerRegistry::load`] resolves every source
//! in registration order and either returns a registry in which every layer is
//! loaded or fails as a whole. [`LayerRegistry::register`] alone yields a
//! registry of pending layers, which draws nothing and cannot be installed.

#[cfg(test)]
#[path = "layer_test.rs"]
mod layer_test;

use std::collections::HashSet;
use std::fmt;

use futures::FutureExt;
use futures::future::LocalBoxFuture;

use crate::error::ParallaxError;
use crate::surface::{Raster, RenderHook, Surface};

/// A raster source that may still be resolving.
pub enum LayerSource<R> {
    /// Already decoded and sized.
    Ready(R),
    /// Resolves later; the error string becomes the load-failure cause.
    Pending(LocalBoxFuture<'static, Result<R, String>>),
}

impl<R: 'static> LayerSource<R> {
    /// Wrap a future of a raster. Its error is rendered with `Display`.
    pub fn pending<F, E>(future: F) -> Self
    where
        F: Future<Output = Result<R, E>> + 'static,
        E: fmt::Display,
    {
        Self::Pending(future.map(|res| res.map_err(|e| e.to_string())).boxed_local())
    }

    async fn resolve(self) -> Result<R, String> {
        match self {
            Self::Ready(raster) => Ok(raster),
            Self::Pending(future) => future.await,
        }
    }
}

impl<R> fmt::Debug for LayerSource<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready(_) => f.write_str("Ready"),
            Self::Pending(_) => f.write_str("Pending"),
        }
    }
}

/// Configuration-time description of one layer.
pub struct LayerDescriptor<S: Surface> {
    pub name: String,
    pub source: LayerSource<S::Source>,
    pub speed: f64,
    pub render: Option<RenderHook<S>>,
}

impl<S: Surface> LayerDescriptor<S> {
    #[must_use]
    pub fn new(name: impl Into<String>, source: LayerSource<S::Source>, speed: f64) -> Self {
        Self { name: name.into(), source, speed, render: None }
    }

    /// Attach a per-frame render hook.
    #[must_use]
    pub fn with_render(mut self, hook: RenderHook<S>) -> Self {
        self.render = Some(hook);
        self
    }
}

/// Progress reported after each layer finishes loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerProgress {
    pub name: String,
    pub count: usize,
    pub total: usize,
}

/// Load status of a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    Pending,
    Loaded,
}

/// What a layer currently holds: its unresolved source or the raster.
pub(crate) enum LayerSlot<R> {
    Pending(LayerSource<R>),
    Loaded(R),
}

/// A registered layer. Only loaded layers are drawn or define bounds.
pub struct Layer<S: Surface> {
    name: String,
    pub(crate) slot: LayerSlot<S::Source>,
    speed: f64,
    pub(crate) hook: Option<RenderHook<S>>,
    /// Offscreen composite, allocated on first draw of a hooked layer.
    pub(crate) buffer: Option<S::Source>,
}

impl<S: Surface> Layer<S> {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The decoded raster, once loaded.
    #[must_use]
    pub fn source(&self) -> Option<&S::Source> {
        match &self.slot {
            LayerSlot::Loaded(raster) => Some(raster),
            LayerSlot::Pending(_) => None,
        }
    }

    #[must_use]
    pub fn speed(&self) -> f64 {
        self.speed
    }

    #[must_use]
    pub fn status(&self) -> LoadStatus {
        match self.slot {
            LayerSlot::Pending(_) => LoadStatus::Pending,
            LayerSlot::Loaded(_) => LoadStatus::Loaded,
        }
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.status() == LoadStatus::Loaded
    }

    #[must_use]
    pub fn has_render_hook(&self) -> bool {
        self.hook.is_some()
    }

    /// Raster width in pixels; 0 while pending.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.source().map_or(0.0, Raster::width)
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.source().map_or(0.0, Raster::height)
    }
}

/// Ordered set of layers. Later layers draw over earlier ones.
pub struct LayerRegistry<S: Surface> {
    layers: Vec<Layer<S>>,
}

impl<S: Surface> Default for LayerRegistry<S> {
    fn default() -> Self {
        Self { layers: Vec::new() }
    }
}

impl<S: Surface> LayerRegistry<S> {
    /// Register and resolve every descriptor in order, reporting progress
    /// after each. Shorthand for [`register`](Self::register) followed by
    /// [`load_all`](Self::load_all).
    ///
    /// # Errors
    ///
    /// Returns [`ParallaxError::Configuration`] for duplicate names or an
    /// invalid speed, and [`ParallaxError::LayerLoad`] for the first source
    /// that fails to resolve or resolves to an empty raster.
    pub async fn load(
        descriptors: Vec<LayerDescriptor<S>>,
        on_progress: impl FnMut(LayerProgress),
    ) -> Result<Self, ParallaxError> {
        Self::register(descriptors)?.load_all(on_progress).await
    }

    /// Validate descriptors and register them as pending layers.
    ///
    /// # Errors
    ///
    /// Returns [`ParallaxError::Configuration`] for an empty or duplicate
    /// name, or a negative or non-finite speed.
    pub fn register(descriptors: Vec<LayerDescriptor<S>>) -> Result<Self, ParallaxError> {
        validate_descriptors(&descriptors)?;
        let layers = descriptors
            .into_iter()
            .map(|LayerDescriptor { name, source, speed, render }| Layer {
                name,
                slot: LayerSlot::Pending(source),
                speed,
                hook: render,
                buffer: None,
            })
            .collect();
        Ok(Self { layers })
    }

    /// Resolve every pending layer in registration order.
    ///
    /// The whole registry fails on the first layer that cannot load; layers
    /// after it are not attempted.
    ///
    /// # Errors
    ///
    /// Returns [`ParallaxError::LayerLoad`] naming the failing layer.
    pub async fn load_all(self, mut on_progress: impl FnMut(LayerProgress)) -> Result<Self, ParallaxError> {
        let total = self.layers.len();
        let mut loaded = Vec::with_capacity(total);
        for layer in self.layers {
            let Layer { name, slot, speed, hook, buffer } = layer;
            let source = match slot {
                LayerSlot::Loaded(raster) => raster,
                LayerSlot::Pending(source) => {
                    log::debug!("loading layer {name}");
                    source
                        .resolve()
                        .await
                        .map_err(|cause| ParallaxError::LayerLoad { layer: name.clone(), cause })?
                }
            };

            let (width, height) = (source.width(), source.height());
            if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
                return Err(ParallaxError::LayerLoad {
                    layer: name,
                    cause: format!("degenerate raster size {width}x{height}"),
                });
            }

            loaded.push(Layer {
                name: name.clone(),
                slot: LayerSlot::Loaded(source),
                speed,
                hook,
                buffer,
            });
            on_progress(LayerProgress { name, count: loaded.len(), total });
        }
        Ok(Self { layers: loaded })
    }

    /// Whether every registered layer has loaded.
    #[must_use]
    pub fn all_loaded(&self) -> bool {
        self.layers.iter().all(Layer::is_loaded)
    }

    /// Look up a layer by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Layer<S>> {
        self.layers.iter().find(|l| l.name == name)
    }

    /// The bound-defining layer: by convention the foreground, registered last.
    #[must_use]
    pub fn last(&self) -> Option<&Layer<S>> {
        self.layers.last()
    }

    /// Layers in draw order (background first).
    pub fn iter(&self) -> impl Iterator<Item = &Layer<S>> {
        self.layers.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Layer<S>> {
        self.layers.iter_mut()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Whether any layer draws custom marks every frame.
    #[must_use]
    pub fn has_render_hooks(&self) -> bool {
        self.layers.iter().any(Layer::has_render_hook)
    }
}

fn validate_descriptors<S: Surface>(descriptors: &[LayerDescriptor<S>]) -> Result<(), ParallaxError> {
    let mut seen = HashSet::new();
    for d in descriptors {
        if d.name.is_empty() {
            return Err(ParallaxError::Configuration("layer name must not be empty".into()));
        }
        if !seen.insert(d.name.as_str()) {
            return Err(ParallaxError::Configuration(format!("duplicate layer name \"{}\"", d.name)));
        }
        if !d.speed.is_finite() || d.speed < 0.0 {
            return Err(ParallaxError::Configuration(format!(
                "layer \"{}\" speed must be a finite non-negative number, got {}",
                d.name, d.speed
            )));
        }
    }
    Ok(())
}
