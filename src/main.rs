use std::env;
use std::fs;
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use log::info;

use shadow_scene::app::print_final_state;
use shadow_scene::{
    ArSession, Runtime, RuntimeOptions, SceneDocument, ShadowMapActivator, UpdatePolicy,
};

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = CliOptions::parse()?;
    let markup = fs::read_to_string(&options.path)
        .with_context(|| format!("failed to read {}", options.path))?;
    let document = SceneDocument::from_xml(&markup).context("failed to parse scene document")?;

    println!("Loaded scene with {} element(s)", document.elements.len());
    for element in &document.elements {
        println!(" - {} ({})", element.id, element.tag);
    }

    let runtime_options = RuntimeOptions {
        light_policy: if options.legacy_light {
            UpdatePolicy::BuildOnce
        } else {
            UpdatePolicy::Reconcile
        },
    };
    let mut runtime = Runtime::from_document(&document, runtime_options)?;

    for update in &options.updates {
        runtime.set_attribute(&update.entity, &update.attribute, &update.value)?;
        println!("Set {}.{} = {}", update.entity, update.attribute, update.value);
    }

    if options.ar_ready {
        activate_shadows(&runtime);
    }

    print_final_state(&runtime);
    Ok(())
}

fn activate_shadows(runtime: &Runtime) {
    let mut session = ArSession::new();
    let mut activator = ShadowMapActivator::default();
    activator.on_load(&mut session);
    session.mark_ready();
    if activator.poll(Instant::now(), Some(runtime.scene())) {
        info!("shadow mapping activated after AR readiness");
        println!("AR session ready, shadow mapping active");
    }
}

struct AttributeUpdate {
    entity: String,
    attribute: String,
    value: String,
}

impl AttributeUpdate {
    fn parse(assignment: &str) -> Result<Self> {
        let (path, value) = assignment
            .split_once('=')
            .ok_or_else(|| anyhow!("expected <entity>.<attribute>=<value>, got `{assignment}`"))?;
        let (entity, attribute) = path
            .split_once('.')
            .ok_or_else(|| anyhow!("expected <entity>.<attribute>=<value>, got `{assignment}`"))?;
        Ok(Self {
            entity: entity.to_string(),
            attribute: attribute.to_string(),
            value: value.to_string(),
        })
    }
}

struct CliOptions {
    path: String,
    updates: Vec<AttributeUpdate>,
    ar_ready: bool,
    legacy_light: bool,
}

impl CliOptions {
    fn parse() -> Result<Self> {
        let mut args = env::args().skip(1);
        let Some(path) = args.next() else {
            return Err(anyhow!(
                "Usage: shadow-scene <scene.xml> [--set <entity>.<attribute>=<value>]... [--ar-ready] [--legacy-light]"
            ));
        };
        let mut updates = Vec::new();
        let mut ar_ready = false;
        let mut legacy_light = false;
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--set" => {
                    let assignment = args
                        .next()
                        .ok_or_else(|| anyhow!("--set requires an argument"))?;
                    updates.push(AttributeUpdate::parse(&assignment)?);
                }
                "--ar-ready" => ar_ready = true,
                "--legacy-light" => legacy_light = true,
                other => {
                    return Err(anyhow!(
                        "Unknown argument: {other}. Expected --set, --ar-ready or --legacy-light"
                    ));
                }
            }
        }
        Ok(Self {
            path,
            updates,
            ar_ready,
            legacy_light,
        })
    }
}
