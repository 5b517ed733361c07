use crate::cli::InputArgs;
use crate::config::{self, Config};
use crate::dataset;
use crate::draw::{self, DrawOptions};
use anyhow::Context;
use orbit_layout::interaction::InteractionOutcome;
use orbit_layout::{
    Group, InteractionState, Item, OrbitEvent, PlanCache, Point, RenderPlan, SelectionHandler,
    compose,
};
use std::path::PathBuf;

/// Logs selections made while simulating pointer input.
#[derive(Debug, Default)]
pub struct LogSelection {
    pub selected: Vec<String>,
}

impl SelectionHandler for LogSelection {
    fn on_group_select(&mut self, group: &Group) {
        log::info!("Selected group '{}'", group.id);
        self.selected.push(group.id.to_string());
    }

    fn on_item_select(&mut self, item: &Item, group: &Group) {
        log::info!("Selected item '{}' in '{}'", item.id, group.id);
        self.selected.push(format!("{}/{}", group.id, item.id));
    }

    fn on_dial_select(&mut self, index: usize) {
        log::info!("Selected dial position {}", index);
        self.selected.push(format!("dial:{index}"));
    }
}

/// Simulated pointer input applied before drawing.
#[derive(Debug, Clone, Default)]
pub struct PointerInput {
    pub pointer: Option<Point>,
    pub click: bool,
    pub dial: Option<usize>,
}

impl PointerInput {
    pub fn apply(
        &self,
        plan: &RenderPlan,
        state: &mut InteractionState,
        handler: &mut impl SelectionHandler,
    ) -> InteractionOutcome {
        let mut redraw = false;
        if let Some(pointer) = self.pointer {
            redraw |= state.pointer_move(plan, pointer, handler).should_redraw;
            if self.click {
                redraw |= state.pointer_click(plan, pointer, handler).should_redraw;
            }
        }
        if let Some(index) = self.dial {
            redraw |= state
                .handle(OrbitEvent::DialClick(index), plan, handler)
                .should_redraw;
        }
        InteractionOutcome {
            should_redraw: redraw,
        }
    }
}

pub struct RenderJob {
    pub input: InputArgs,
    pub config_path: Option<PathBuf>,
    pub output: PathBuf,
    pub pointer: PointerInput,
    pub draw: DrawOptions,
    cache: PlanCache,
}

impl RenderJob {
    pub fn new(
        input: InputArgs,
        config_path: Option<PathBuf>,
        output: PathBuf,
        pointer: PointerInput,
        draw: DrawOptions,
    ) -> Self {
        Self {
            input,
            config_path,
            output,
            pointer,
            draw,
            cache: PlanCache::new(),
        }
    }

    /// Config files whose changes should trigger another render.
    pub fn config_paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self.config_path.iter().cloned().collect();
        if let Ok(path) = config::get_config_path() {
            paths.push(path);
        }
        paths
    }

    pub fn run(&mut self) -> anyhow::Result<()> {
        let config: Config = config::load_config(self.config_path.as_deref())?;
        let dataset = dataset::load(self.input.dataset.as_deref())?;
        let options = self.input.layout(&config.layout);
        let plan = self.cache.get_or_plan(&dataset, &options);

        let mut state = InteractionState::new();
        let mut selection = LogSelection::default();
        self.pointer.apply(plan, &mut state, &mut selection);

        let scene = compose(plan, &state, &config.style(), &dataset.center);
        draw::write_scene(&scene, &self.output, &self.draw)
            .with_context(|| format!("Failed to write {}", self.output.display()))?;
        log::info!(
            "Rendered {} orbit(s) to {}",
            plan.orbits.len(),
            self.output.display()
        );
        Ok(())
    }

    pub fn plans_computed(&self) -> usize {
        self.cache.computed()
    }
}
