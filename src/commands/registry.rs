// src/commands/registry.rs
use std::collections::HashMap;
use super::types::Command;

pub struct CommandRegistry {
    commands: HashMap<String, Box<dyn Command>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self {
            commands: HashMap::new(),
        }
    }

    pub fn register(&mut self, cmd: Box<dyn Command>) {
        self.commands.insert(cmd.name().to_string(), cmd);
    }

    pub fn get(&self, name: &str) -> Option<&dyn Command> {
        self.commands.get(name).map(|c| c.as_ref())
    }

    /// Registered command names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.commands.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

use super::cat::CatCommand;
use super::chmod::ChmodCommand;
use super::cp::CpCommand;
use super::find::FindCommand;
use super::info_cmd::InfoCommand;
use super::ls::LsCommand;
use super::mkdir::MkdirCommand;
use super::mv::MvCommand;
use super::rm::RmCommand;
use super::touch::TouchCommand;
use super::tree_cmd::TreeCommand;

/// 注册所有文件系统命令
pub fn register_filesystem_commands(registry: &mut CommandRegistry) {
    registry.register(Box::new(LsCommand));
    registry.register(Box::new(TreeCommand));
    registry.register(Box::new(CpCommand));
    registry.register(Box::new(MvCommand));
    registry.register(Box::new(RmCommand));
    registry.register(Box::new(MkdirCommand));
    registry.register(Box::new(TouchCommand));
    registry.register(Box::new(CatCommand));
    registry.register(Box::new(FindCommand));
    registry.register(Box::new(ChmodCommand));
    registry.register(Box::new(InfoCommand));
}

/// 创建默认注册表
pub fn create_default_registry() -> CommandRegistry {
    let mut registry = CommandRegistry::new();
    register_filesystem_commands(&mut registry);
    registry
}
