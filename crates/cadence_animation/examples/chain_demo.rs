//! Chained Entrance Demo
//!
//! Drives a small card entrance with a manual clock and logs every callback:
//! - a fade in, with a scale-up running together with it
//! - a slide that waits for the fade group to finish
//! - an endless pulse chained after the slide, paused and then completed
//!
//! Pass a TOML file path to override the scheduler config.
//!
//! Run with: RUST_LOG=cadence_animation=debug cargo run -p cadence_animation --example chain_demo

use anyhow::{Context, Result};
use cadence_animation::{
    AnimationHandle, AnimationScheduler, AnimationWrapper, SchedulerConfig, Timing,
};
use std::cell::Cell;
use std::rc::Rc;

const FRAME: f64 = 1.0 / 20.0;

/// Tween between two values and print the lifecycle
struct Tween {
    name: &'static str,
    value: Cell<f32>,
}

impl Tween {
    fn new(name: &'static str) -> Rc<Self> {
        Rc::new(Self {
            name,
            value: Cell::new(0.0),
        })
    }
}

impl AnimationWrapper for Tween {
    fn update_animation(
        &self,
        scheduler: &mut AnimationScheduler,
        handle: AnimationHandle,
        percent_done: f32,
    ) {
        if let Some(&(from, to)) = scheduler.payload::<(f32, f32)>(handle) {
            self.value.set(from + (to - from) * percent_done);
        }
    }

    fn start(&self, _: &mut AnimationScheduler, handle: AnimationHandle, iteration: u32) {
        tracing::info!(name = self.name, %handle, iteration, "start");
    }

    fn complete(&self, _: &mut AnimationScheduler, handle: AnimationHandle) {
        tracing::info!(name = self.name, %handle, value = self.value.get(), "complete");
    }

    fn paused(&self, _: &mut AnimationScheduler, handle: AnimationHandle) {
        tracing::info!(name = self.name, %handle, "paused");
    }

    fn resumed(&self, _: &mut AnimationScheduler, handle: AnimationHandle) {
        tracing::info!(name = self.name, %handle, "resumed");
    }

    fn canceled(&self, _: &mut AnimationScheduler, handle: AnimationHandle) {
        tracing::info!(name = self.name, %handle, "canceled");
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => SchedulerConfig::load(&path)
            .with_context(|| format!("loading scheduler config from {path}"))?,
        None => SchedulerConfig::standard(),
    };
    let (mut scheduler, clock) = AnimationScheduler::with_manual_clock(config);

    let fade = Tween::new("fade");
    let scale = Tween::new("scale");
    let slide = Tween::new("slide");
    let pulse = Tween::new("pulse");

    let fade_handle = scheduler.run((0.0f32, 1.0f32), Timing::once(0.5), fade.clone());
    scheduler.run_together(fade_handle, (0.8f32, 1.0f32), Timing::once(0.4), scale.clone());
    let fade_group = scheduler
        .group_of(fade_handle)
        .context("fade should belong to a group")?;
    let slide_handle =
        scheduler.run_after(fade_group, (-40.0f32, 0.0f32), Timing::once(0.3), slide.clone());
    let pulse_handle =
        scheduler.run_after(slide_handle, (1.0f32, 1.05f32), Timing::forever(0.25), pulse.clone());

    let mut frame = 0u32;
    while !scheduler.is_complete(pulse_handle) {
        clock.advance(FRAME);
        scheduler.update();
        frame += 1;

        match frame {
            24 => scheduler.pause(pulse_handle),
            30 => scheduler.resume(pulse_handle),
            40 => scheduler.complete(pulse_handle, false),
            _ => {}
        }
        scheduler
            .validate()
            .with_context(|| format!("scheduler tables inconsistent after frame {frame}"))?;
    }

    tracing::info!(
        frames = frame,
        seconds = scheduler.now(),
        opacity = fade.value.get(),
        scale = scale.value.get(),
        offset = slide.value.get(),
        stats = ?scheduler.stats(),
        "entrance finished"
    );
    Ok(())
}
