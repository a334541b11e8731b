//! Project management commands: `taskboard project`.

use anyhow::{Context, Result};
use std::path::Path;

use taskboard::board::db::BoardDb;
use taskboard::board::github::parse_repo_ref;
use taskboard::board::models::{Member, Project, RepoRef};
use taskboard::config::BoardConfig;

use super::super::ProjectCommands;

fn open_db(project_dir: &Path, db_path: Option<&Path>) -> Result<BoardDb> {
    let config = BoardConfig::load_or_default(&super::data_dir(project_dir))?;
    let path = super::resolve_db_path(project_dir, db_path, &config);
    if !path.exists() {
        anyhow::bail!(
            "No database at {}. Run 'taskboard init' first.",
            path.display()
        );
    }
    BoardDb::new(&path)
}

fn parse_repo(input: &str) -> Result<RepoRef> {
    parse_repo_ref(input)
        .with_context(|| format!("Not a GitHub repository: '{}' (expected owner/repo or URL)", input))
}

fn print_project(project: &Project) {
    println!("{} (id {}): {}", project.key, project.id, project.name);
    match &project.repository {
        Some(repo) => println!("  repository: {}", repo),
        None => println!("  repository: (none)"),
    }
    println!("  tasks: {} (next id {}-{:03})", project.tasks.len(), project.key, project.counter + 1);
    if project.members.is_empty() {
        println!("  members: (none)");
    } else {
        println!("  members:");
        for m in &project.members {
            println!("    {} ({})", m.name, m.user_id);
        }
    }
}

pub fn cmd_project(project_dir: &Path, db_path: Option<&Path>, command: ProjectCommands) -> Result<()> {
    let db = open_db(project_dir, db_path)?;

    match command {
        ProjectCommands::Add {
            key,
            name,
            members,
            github,
        } => {
            let members = members
                .iter()
                .map(|m| m.parse::<Member>())
                .collect::<Result<Vec<_>, _>>()?;
            let repository = github.as_deref().map(parse_repo).transpose()?;
            let project = db.create_project(&key, &name, members, repository)?;
            tracing::info!(project_id = project.id, key = %project.key, "Project created");
            println!("Created project {} (id {})", project.key, project.id);
        }
        ProjectCommands::List => {
            let projects = db.list_projects()?;
            if projects.is_empty() {
                println!("No projects. Create one with 'taskboard project add'.");
                return Ok(());
            }
            for p in &projects {
                let repo = p
                    .repository
                    .as_ref()
                    .map(|r| r.to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!("{:>4}  {:<10}  {:<30}  {:>5} tasks  {}", p.id, p.key, p.name, p.tasks.len(), repo);
            }
        }
        ProjectCommands::Show { id } => {
            let project = db.require_project(id)?;
            print_project(&project);
        }
        ProjectCommands::AddMember { id, member } => {
            let member: Member = member.parse()?;
            let name = member.name.clone();
            let project = db.add_member(id, member)?;
            println!("{} now has {} member(s), including {}", project.key, project.members.len(), name);
        }
        ProjectCommands::SetRepo { id, github, clear } => {
            let repository = match (github, clear) {
                (_, true) => None,
                (Some(g), false) => Some(parse_repo(&g)?),
                (None, false) => anyhow::bail!("Pass a repository or --clear"),
            };
            let project = db.set_repository(id, repository)?;
            match &project.repository {
                Some(repo) => println!("Linked {} to {}", project.key, repo),
                None => println!("Unlinked repository from {}", project.key),
            }
        }
    }

    Ok(())
}
