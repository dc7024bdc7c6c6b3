//! SDK entry points and builder for composing the footprint scene app.

use bevy::prelude::*;

use crate::camera::orbit_camera_plugin;
use crate::config::SceneConfig;
use crate::data::{batch_channel, init_fixture_channel, BatchChannel};
use crate::render::{ExtrudedRenderer, FootprintRenderer, RendererResource};
use crate::scene::{footprint_scene_plugin, setup_scene, spawn_ground_plane};

/// Builder for constructing a footprint scene app with customizable plugins.
pub struct FootprintSceneBuilder {
    config: SceneConfig,
    channel: Option<BatchChannel>,
    renderer: Option<Box<dyn FootprintRenderer>>,
    window_title: String,
    window_resolution: (f32, f32),
    clear_color: Color,
    enable_orbit_camera: bool,
    enable_ground_plane: bool,
}

impl Default for FootprintSceneBuilder {
    fn default() -> Self {
        Self {
            config: SceneConfig::default(),
            channel: None,
            renderer: None,
            window_title: "Footprints".to_string(),
            window_resolution: (1280.0, 720.0),
            clear_color: Color::srgb(0.05, 0.05, 0.08),
            enable_orbit_camera: true,
            enable_ground_plane: true,
        }
    }
}

impl FootprintSceneBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: SceneConfig) -> Self {
        self.config = config;
        self
    }

    /// Read the configuration from environment variables.
    pub fn env_config(mut self) -> Self {
        self.config = SceneConfig::from_env();
        self
    }

    /// Feed batches from an existing channel instead of the configured data
    /// file. Pair with a [`crate::data::RecordBatchSender`] from
    /// [`crate::data::batch_channel`].
    pub fn records(mut self, channel: BatchChannel) -> Self {
        self.channel = Some(channel);
        self
    }

    /// Provide a custom footprint renderer implementation.
    pub fn renderer(mut self, renderer: impl FootprintRenderer) -> Self {
        self.renderer = Some(Box::new(renderer));
        self
    }

    pub fn window_title(mut self, title: impl Into<String>) -> Self {
        self.window_title = title.into();
        self
    }

    pub fn window_resolution(mut self, width: f32, height: f32) -> Self {
        self.window_resolution = (width, height);
        self
    }

    pub fn clear_color(mut self, color: Color) -> Self {
        self.clear_color = color;
        self
    }

    pub fn disable_orbit_camera(mut self) -> Self {
        self.enable_orbit_camera = false;
        self
    }

    pub fn disable_ground_plane(mut self) -> Self {
        self.enable_ground_plane = false;
        self
    }

    /// Build the Bevy app with the selected configuration and plugins.
    pub fn build(self) -> App {
        let channel = self
            .channel
            .unwrap_or_else(|| data_channel(&self.config));
        let renderer = self
            .renderer
            .unwrap_or_else(|| Box::new(ExtrudedRenderer::default()));

        let mut app = App::new();
        app.add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: self.window_title,
                resolution: self.window_resolution.into(),
                ..default()
            }),
            ..default()
        }))
        .insert_resource(ClearColor(self.clear_color))
        .insert_resource(channel)
        .insert_resource(RendererResource(renderer))
        .insert_resource(self.config.pipeline_settings())
        .insert_resource(self.config.fit_settings())
        .add_plugins(footprint_scene_plugin)
        .add_systems(Startup, setup_scene);

        if self.enable_orbit_camera {
            app.add_plugins(orbit_camera_plugin);
        }
        if self.enable_ground_plane {
            app.add_systems(Startup, spawn_ground_plane);
        }

        app
    }
}

/// Fixture channel for the configured data file, or an idle channel when
/// there is none or it cannot be read.
fn data_channel(config: &SceneConfig) -> BatchChannel {
    let Some(path) = config.data_path.as_deref() else {
        return batch_channel().1;
    };
    init_fixture_channel(path).unwrap_or_else(|err| {
        eprintln!("footprints: {err}; starting with an empty scene");
        batch_channel().1
    })
}
