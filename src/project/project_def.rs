//! Project tree definition and builder

#![allow(clippy::must_use_candidate, clippy::return_self_not_must_use)]

use super::build_type::BuildType;
use super::errors::ValidationError;
use super::template::{self, Template};
use super::types::{Validate, validate_id};
use super::vcs::VcsRoot;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// A node of the configuration tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Project {
    /// Identifier, unique across the tree
    pub id: String,

    /// Display name
    #[serde(default)]
    pub name: String,

    /// Description
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub description: Option<String>,

    /// VCS roots visible to this project and its sub-projects
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub vcs_roots: Vec<VcsRoot>,

    /// Templates visible to this project and its sub-projects
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub templates: Vec<Template>,

    /// Build types owned by this project
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub build_types: Vec<BuildType>,

    /// Nested projects
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub sub_projects: Vec<Project>,
}

impl Project {
    /// Creates a new project builder
    pub fn builder(id: impl Into<String>) -> ProjectBuilder {
        ProjectBuilder::new(id)
    }

    /// Finds a build type anywhere in the tree
    pub fn build_type(&self, id: &str) -> Option<&BuildType> {
        self.build_types
            .iter()
            .find(|b| b.id == id)
            .or_else(|| self.sub_projects.iter().find_map(|p| p.build_type(id)))
    }

    /// Finds a template anywhere in the tree
    pub fn template(&self, id: &str) -> Option<&Template> {
        self.templates
            .iter()
            .find(|t| t.id == id)
            .or_else(|| self.sub_projects.iter().find_map(|p| p.template(id)))
    }

    fn locate<'a>(&'a self, id: &str, chain: &mut Vec<&'a Project>) -> Option<&'a BuildType> {
        chain.push(self);
        if let Some(build_type) = self.build_types.iter().find(|b| b.id == id) {
            return Some(build_type);
        }
        for sub in &self.sub_projects {
            if let Some(build_type) = sub.locate(id, chain) {
                return Some(build_type);
            }
        }
        chain.pop();
        None
    }

    /// Returns a build type with the templates it is based on merged in.
    ///
    /// Templates are looked up in the owning project and its ancestors,
    /// nearest first; unknown template ids are skipped.
    pub fn effective_build_type(&self, id: &str) -> Option<BuildType> {
        let mut chain = Vec::new();
        let build_type = self.locate(id, &mut chain)?;
        let templates: Vec<&Template> = build_type
            .templates
            .iter()
            .filter_map(|wanted| {
                chain
                    .iter()
                    .rev()
                    .find_map(|p| p.templates.iter().find(|t| &t.id == wanted))
            })
            .collect();
        Some(template::resolve(build_type, &templates))
    }

    /// Finds a mutable build type anywhere in the tree
    pub fn build_type_mut(&mut self, id: &str) -> Option<&mut BuildType> {
        if let Some(index) = self.build_types.iter().position(|b| b.id == id) {
            return Some(&mut self.build_types[index]);
        }
        self.sub_projects
            .iter_mut()
            .find_map(|p| p.build_type_mut(id))
    }

    /// Finds a project anywhere in the tree, including this one
    pub fn project(&self, id: &str) -> Option<&Project> {
        if self.id == id {
            return Some(self);
        }
        self.sub_projects.iter().find_map(|p| p.project(id))
    }

    /// Returns every build type in the tree, depth first
    pub fn all_build_types(&self) -> Vec<&BuildType> {
        let mut out: Vec<&BuildType> = self.build_types.iter().collect();
        for sub in &self.sub_projects {
            out.extend(sub.all_build_types());
        }
        out
    }

    /// Returns the number of build types in the tree
    pub fn build_type_count(&self) -> usize {
        self.build_types.len()
            + self
                .sub_projects
                .iter()
                .map(Project::build_type_count)
                .sum::<usize>()
    }

    fn collect_ids<'a>(
        &'a self,
        projects: &mut HashSet<&'a str>,
        build_types: &mut HashSet<&'a str>,
        templates: &mut HashSet<&'a str>,
    ) -> Result<(), ValidationError> {
        validate_id(&self.id)?;
        if !projects.insert(&self.id) {
            return Err(ValidationError::DuplicateProject {
                id: self.id.clone(),
            });
        }
        for build_type in &self.build_types {
            if !build_types.insert(&build_type.id) {
                return Err(ValidationError::DuplicateBuildType {
                    id: build_type.id.clone(),
                });
            }
        }
        for template in &self.templates {
            if !templates.insert(&template.id) {
                return Err(ValidationError::DuplicateTemplate {
                    id: template.id.clone(),
                });
            }
        }
        for sub in &self.sub_projects {
            sub.collect_ids(projects, build_types, templates)?;
        }
        Ok(())
    }

    fn validate_scoped<'a>(
        &'a self,
        visible_roots: &mut Vec<&'a str>,
        visible_templates: &mut Vec<&'a Template>,
        build_type_ids: &HashSet<&str>,
    ) -> Result<(), ValidationError> {
        let inherited_roots = visible_roots.len();
        for root in &self.vcs_roots {
            root.validate()?;
            visible_roots.push(&root.id);
        }

        let inherited_templates = visible_templates.len();
        for template in &self.templates {
            template.validate()?;
            visible_templates.push(template);
        }

        for declared in &self.build_types {
            declared.validate()?;
            let mut based_on = Vec::with_capacity(declared.templates.len());
            for wanted in &declared.templates {
                let found = visible_templates
                    .iter()
                    .rev()
                    .find(|t| &t.id == wanted)
                    .ok_or_else(|| ValidationError::UnknownTemplate {
                        build_type: declared.id.clone(),
                        template: wanted.clone(),
                    })?;
                based_on.push(*found);
            }
            let build_type = template::resolve(declared, &based_on);
            if !based_on.is_empty() {
                build_type.validate()?;
            }

            for root in &build_type.vcs_roots {
                if !visible_roots.iter().any(|visible| *visible == root.as_str()) {
                    return Err(ValidationError::UnknownVcsRoot {
                        build_type: build_type.id.clone(),
                        root: root.clone(),
                    });
                }
            }
            for dependency in &build_type.dependencies {
                if !build_type_ids.contains(dependency.build_type.as_str()) {
                    return Err(ValidationError::UnknownDependency {
                        build_type: build_type.id.clone(),
                        dependency: dependency.build_type.clone(),
                    });
                }
            }
        }

        for sub in &self.sub_projects {
            sub.validate_scoped(visible_roots, visible_templates, build_type_ids)?;
        }

        visible_roots.truncate(inherited_roots);
        visible_templates.truncate(inherited_templates);
        Ok(())
    }

    fn check_dependency_cycles(&self) -> Result<(), ValidationError> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Visiting,
            Done,
        }

        fn visit<'a>(
            id: &'a str,
            edges: &'a HashMap<String, Vec<String>>,
            marks: &mut HashMap<&'a str, Mark>,
        ) -> Result<(), ValidationError> {
            match marks.get(id) {
                Some(Mark::Done) => return Ok(()),
                Some(Mark::Visiting) => {
                    return Err(ValidationError::CircularDependency {
                        build_type: id.to_string(),
                    });
                }
                None => {}
            }
            marks.insert(id, Mark::Visiting);
            for next in edges.get(id).into_iter().flatten() {
                visit(next, edges, marks)?;
            }
            marks.insert(id, Mark::Done);
            Ok(())
        }

        // Dependencies inherited from templates count as edges too.
        let edges: HashMap<String, Vec<String>> = self
            .all_build_types()
            .into_iter()
            .filter_map(|b| self.effective_build_type(&b.id))
            .map(|b| {
                let targets = b.dependencies.into_iter().map(|d| d.build_type).collect();
                (b.id, targets)
            })
            .collect();

        let mut marks = HashMap::new();
        for id in edges.keys() {
            visit(id, &edges, &mut marks)?;
        }
        Ok(())
    }
}

impl Validate for Project {
    type Error = ValidationError;

    fn validate(&self) -> Result<(), Self::Error> {
        let mut project_ids = HashSet::new();
        let mut build_type_ids = HashSet::new();
        let mut template_ids = HashSet::new();
        self.collect_ids(&mut project_ids, &mut build_type_ids, &mut template_ids)?;
        if let Some(clash) = template_ids.intersection(&build_type_ids).next() {
            return Err(ValidationError::DuplicateTemplate {
                id: (*clash).to_string(),
            });
        }

        let mut visible_roots = Vec::new();
        let mut visible_templates = Vec::new();
        self.validate_scoped(&mut visible_roots, &mut visible_templates, &build_type_ids)?;

        self.check_dependency_cycles()
    }
}

impl fmt::Display for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Project({}): {} build types, {} sub-projects",
            self.id,
            self.build_type_count(),
            self.sub_projects.len()
        )
    }
}

/// Builder for creating project trees
#[derive(Debug, Clone)]
pub struct ProjectBuilder {
    project: Project,
}

impl ProjectBuilder {
    /// Creates a new builder; the name defaults to the id
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            project: Project {
                name: id.clone(),
                id,
                description: None,
                vcs_roots: Vec::new(),
                templates: Vec::new(),
                build_types: Vec::new(),
                sub_projects: Vec::new(),
            },
        }
    }

    /// Sets display name
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.project.name = name.into();
        self
    }

    /// Sets description
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.project.description = Some(description.into());
        self
    }

    /// Declares a VCS root
    pub fn vcs_root(mut self, root: VcsRoot) -> Self {
        self.project.vcs_roots.push(root);
        self
    }

    /// Declares a template
    pub fn template(mut self, template: Template) -> Self {
        self.project.templates.push(template);
        self
    }

    /// Adds a build type
    pub fn build_type(mut self, build_type: BuildType) -> Self {
        self.project.build_types.push(build_type);
        self
    }

    /// Adds a sub-project
    pub fn sub_project(mut self, project: Project) -> Self {
        self.project.sub_projects.push(project);
        self
    }

    /// Builds and validates the whole tree
    #[allow(clippy::missing_errors_doc)]
    pub fn build(self) -> Result<Project, ValidationError> {
        self.project.validate()?;
        tracing::debug!(project = %self.project.id, "project tree validated");
        Ok(self.project)
    }

    /// Builds the tree without validation, for nesting into a parent
    #[must_use]
    pub fn build_unchecked(self) -> Project {
        self.project
    }
}
