//! Demo command groups

use std::collections::BTreeMap;
use std::sync::Arc;

use acf_core::commands::{CommandGroup, ParameterSpec, SubcommandSpec};
use acf_core::{ArgumentError, CommandEnum, CommandHelp, CommandManager, RegistrationError};
use parking_lot::Mutex;

/// In-memory tag storage shared by the `tag` commands
#[derive(Default)]
pub struct TagStore {
    tags: Mutex<BTreeMap<String, String>>,
}

impl TagStore {
    fn names(&self) -> Vec<String> {
        self.tags.lock().keys().cloned().collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, CommandEnum)]
enum GameMode {
    Survival,
    Creative,
    Adventure,
    #[command_enum(rename = "spectator")]
    Spectate,
}

pub fn register(manager: &CommandManager) -> Result<(), RegistrationError> {
    manager.register_dependency(Arc::new(TagStore::default()))?;
    let store = manager.dependencies().get::<TagStore>()?;
    manager
        .completions()
        .register_completion("tags", move |_| store.names());

    manager.register_with(tag_group)?;
    manager.register_command(gamemode_group())?;
    manager.register_command(give_group())?;
    manager.register_command(
        CommandGroup::new("whoami").subcommand(SubcommandSpec::default_command().handler(
            |inv, _| {
                let thread = if inv.is_async() { "worker" } else { "main" };
                inv.reply(&format!(
                    "You are {} (running on the {} thread)",
                    inv.issuer().unique_id(),
                    thread
                ));
                Ok(())
            },
        )),
    )?;
    Ok(())
}

fn tag_group(deps: &acf_core::commands::Dependencies) -> Result<CommandGroup, RegistrationError> {
    let store = deps.get::<TagStore>()?;
    let (add, remove, list, show) = (
        Arc::clone(&store),
        Arc::clone(&store),
        Arc::clone(&store),
        store,
    );

    Ok(CommandGroup::new("tag|t")
        .description("Manage tags")
        .subcommand(
            SubcommandSpec::new("add|create")
                .description("Save a tag")
                .param(ParameterSpec::string("name").single())
                .param(ParameterSpec::string("content"))
                .handler(move |inv, args| {
                    let name: &String = args.value("name")?;
                    let content: &String = args.value("content")?;
                    add.tags.lock().insert(name.to_lowercase(), content.clone());
                    inv.reply_info(&format!("Tag {name} saved."));
                    Ok(())
                }),
        )
        .subcommand(
            SubcommandSpec::new("remove|rm")
                .description("Delete a tag")
                .param(ParameterSpec::string("name").single().completion("@tags"))
                .handler(move |inv, args| {
                    let name: &String = args.value("name")?;
                    if remove.tags.lock().remove(&name.to_lowercase()).is_none() {
                        return Err(ArgumentError::literal(format!("No tag named {name}.")).into());
                    }
                    inv.reply_info(&format!("Tag {name} removed."));
                    Ok(())
                }),
        )
        .subcommand(
            SubcommandSpec::new("list")
                .description("List every tag")
                .handler(move |inv, _| {
                    let names = list.names();
                    if names.is_empty() {
                        inv.reply_info("No tags yet.");
                    } else {
                        inv.reply_info(&names.join(", "));
                    }
                    Ok(())
                }),
        )
        .subcommand(
            SubcommandSpec::new("help")
                .help_command()
                .description("Show this help")
                .param(ParameterSpec::of::<CommandHelp>("help"))
                .handler(|inv, args| {
                    let help: &CommandHelp = args.value("help")?;
                    help.show_help(inv.manager(), inv.issuer().as_ref());
                    Ok(())
                }),
        )
        .subcommand(
            SubcommandSpec::default_command()
                .param(ParameterSpec::string("name").single().completion("@tags"))
                .handler(move |inv, args| {
                    let name: &String = args.value("name")?;
                    let content = show.tags.lock().get(&name.to_lowercase()).cloned();
                    match content {
                        Some(content) => inv.reply(&content),
                        None => inv.reply_error(&format!("No tag named {name}.")),
                    }
                    Ok(())
                }),
        ))
}

fn gamemode_group() -> CommandGroup {
    CommandGroup::new("gamemode|gm")
        .description("Switch game mode")
        .subcommand(
            SubcommandSpec::default_command()
                .param(ParameterSpec::enumeration::<GameMode>("mode"))
                .param(ParameterSpec::flag("silent|s"))
                .handler(|inv, args| {
                    let mode: &GameMode = args.value("mode")?;
                    if !args.flag("silent") {
                        inv.reply_info(&format!("Game mode set to {}", mode.name()));
                    }
                    Ok(())
                }),
        )
}

fn give_group() -> CommandGroup {
    CommandGroup::new("give")
        .description("Give yourself an item")
        .subcommand(
            SubcommandSpec::default_command()
                .param(
                    ParameterSpec::string("item")
                        .single()
                        .values(&["apple", "bread", "torch"]),
                )
                .param(
                    ParameterSpec::of::<i32>("amount")
                        .default_value("1")
                        .modifiers("min=1,max=64"),
                )
                .handler(|inv, args| {
                    let item: &String = args.value("item")?;
                    let amount: &i32 = args.value("amount")?;
                    inv.reply(&format!("Gave {amount} x {item}"));
                    Ok(())
                }),
        )
}
