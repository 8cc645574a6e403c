//! Dynamic query engine: turns the query model into SQL Anywhere commands
//!
//! Every command is built with named `@pN` parameters and anonymized as the
//! last step, so the returned text only contains `?` placeholders and the
//! parameter list follows placeholder order.

use crate::command::{Command, ParameterDirection};
use crate::driver::IDENTITY_SEQUENCE;
use crate::error::QueryConstructionError;
use crate::model::ElementRef;

use super::creator::SpecificCreator;
use super::fragments::{QueryFragments, Slot};
use super::function_mappings::FunctionMappingStore;
use super::model::{EntityField, FieldPersistenceInfo, GroupByClause, Predicate, SortClause, SortDirection};
use super::name_overwrites::SchemaNameOverwrites;
use super::output::{ActionQuery, ParameterFieldRelation, RetrievalQuery, SequenceRetrievalQuery};
use super::parameters::{make_parameters_anonymous, ParameterCollector};
use super::relations::RelationCollection;
use super::renderer::SqlRenderer;

/// Everything a select needs
#[derive(Debug, Clone, Default)]
pub struct SelectRequest {
    pub select_list: Vec<EntityField>,
    pub filter: Option<Predicate>,
    pub relations: RelationCollection,
    pub sort_clauses: Vec<SortClause>,
    pub group_by: Option<GroupByClause>,
    /// 0 means no limit
    pub max_rows: usize,
    pub allow_duplicates: bool,
}

impl SelectRequest {
    pub fn new(select_list: Vec<EntityField>) -> Self {
        Self {
            select_list,
            ..Default::default()
        }
    }

    pub fn with_filter(mut self, filter: Predicate) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_relations(mut self, relations: RelationCollection) -> Self {
        self.relations = relations;
        self
    }

    pub fn order_by(mut self, clause: SortClause) -> Self {
        self.sort_clauses.push(clause);
        self
    }

    pub fn with_group_by(mut self, group_by: GroupByClause) -> Self {
        self.group_by = Some(group_by);
        self
    }

    pub fn with_max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = max_rows;
        self
    }

    pub fn allowing_duplicates(mut self) -> Self {
        self.allow_duplicates = true;
        self
    }

    fn has_group_by(&self) -> bool {
        self.group_by.as_ref().is_some_and(|g| !g.is_empty())
    }
}

/// A select whose slots can still be filled before it is rendered
struct SelectStatement {
    fragments: QueryFragments,
    top: Slot,
    paging: Slot,
    query: RetrievalQuery,
}

impl SelectStatement {
    fn finish(self, parameters: ParameterCollector) -> RetrievalQuery {
        RetrievalQuery {
            command: finish_command(self.fragments.render(), parameters),
            ..self.query
        }
    }
}

fn finish_command(text: String, parameters: ParameterCollector) -> Command {
    let (text, parameters) = make_parameters_anonymous(&text, parameters.parameters());
    log::trace!("Generated Sql query: {}", text);
    Command {
        text,
        parameters,
        ..Command::default()
    }
}

fn target_of(fields: &[EntityField]) -> Result<&FieldPersistenceInfo, QueryConstructionError> {
    fields
        .iter()
        .find_map(|f| f.persistence.as_ref())
        .ok_or_else(|| QueryConstructionError::MissingPersistenceInfo {
            field: fields.first().map(|f| f.name.clone()).unwrap_or_default(),
        })
}

fn persistence_of(field: &EntityField) -> Result<&FieldPersistenceInfo, QueryConstructionError> {
    field
        .persistence
        .as_ref()
        .ok_or_else(|| QueryConstructionError::MissingPersistenceInfo {
            field: field.name.clone(),
        })
}

/// Builds insert, update, delete and select commands
#[derive(Debug, Clone)]
pub struct DynamicQueryEngine {
    creator: SpecificCreator,
    functions: &'static FunctionMappingStore,
}

impl Default for DynamicQueryEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl DynamicQueryEngine {
    pub fn new() -> Self {
        Self::with_creator(SpecificCreator::new())
    }

    pub fn with_creator(creator: SpecificCreator) -> Self {
        Self {
            creator,
            functions: FunctionMappingStore::sql_anywhere(),
        }
    }

    /// Schema overwrites for the commands built by this engine only
    pub fn with_per_call_overwrites(mut self, overwrites: SchemaNameOverwrites) -> Self {
        self.creator = self.creator.with_per_call_overwrites(overwrites);
        self
    }

    pub fn creator(&self) -> &SpecificCreator {
        &self.creator
    }

    pub fn function_mappings(&self) -> &FunctionMappingStore {
        self.functions
    }

    fn renderer<'a>(&'a self, parameters: &'a mut ParameterCollector) -> SqlRenderer<'a> {
        SqlRenderer::new(&self.creator, self.functions, parameters)
    }

    /// Insert of the changed fields. Identity fields are read back through a
    /// `SELECT @@IDENTITY` query bound to an in/out parameter.
    pub fn create_insert(&self, fields: &[EntityField]) -> Result<ActionQuery, QueryConstructionError> {
        log::trace!("create_insert: Method Enter");
        if fields.is_empty() {
            return Err(QueryConstructionError::EmptyInsert);
        }
        let target = target_of(fields)?;
        let mut parameters = ParameterCollector::new();
        let mut query = ActionQuery::default();
        let mut columns = Vec::new();
        let mut values = Vec::new();
        let mut has_identity = false;

        for field in fields {
            let persistence = persistence_of(field)?;
            if persistence.is_identity() {
                let name = parameters.next_name();
                let parameter = self.creator.create_field_parameter(
                    name,
                    persistence,
                    ParameterDirection::InputOutput,
                    field.current_value.clone(),
                );
                query.parameter_field_relations.push(ParameterFieldRelation {
                    field_name: field.name.clone(),
                    parameter_name: parameter.name.clone(),
                });
                query.sequence_retrieval_queries.push(SequenceRetrievalQuery {
                    command: Command::text(format!("SELECT {}", IDENTITY_SEQUENCE)),
                    sequence_parameter: parameter,
                    execute_before_main: false,
                });
                has_identity = true;
                continue;
            }
            if !field.is_changed || field.is_read_only {
                continue;
            }
            columns.push(self.creator.create_field_name_simple(persistence));
            let name = parameters.next_name();
            values.push(parameters.add(self.creator.create_field_parameter(
                name,
                persistence,
                ParameterDirection::Input,
                field.current_value.clone(),
            )));
        }

        if columns.is_empty() && !has_identity {
            return Err(QueryConstructionError::EmptyInsert);
        }

        let mut fragments = QueryFragments::new();
        fragments
            .add(format!("INSERT INTO {}", self.creator.create_object_name_for(target)))
            .add_comma_delimited(&columns, true)
            .add("VALUES");
        if values.is_empty() {
            fragments.add("()");
        } else {
            fragments.add_comma_delimited(&values, true);
        }

        query.command = finish_command(fragments.render(), parameters);
        log::trace!("create_insert: Method Exit");
        Ok(query)
    }

    /// Update of the changed, writable, non-identity fields
    pub fn create_update(
        &self,
        fields: &[EntityField],
        filter: Option<&Predicate>,
        relations: Option<&RelationCollection>,
    ) -> Result<ActionQuery, QueryConstructionError> {
        log::trace!("create_update: Method Enter");
        let target = target_of(fields).map_err(|_| QueryConstructionError::EmptyUpdate)?;
        let mut parameters = ParameterCollector::new();
        let mut fragments = QueryFragments::new();
        {
            let mut renderer = self.renderer(&mut parameters);
            let mut assignments = Vec::new();
            for field in fields {
                let persistence = persistence_of(field)?;
                if !field.is_changed || field.is_read_only || persistence.is_identity() {
                    continue;
                }
                let value = match &field.expression {
                    Some(expression) => renderer.expression(expression)?,
                    None => renderer.field_value(persistence, &field.current_value),
                };
                assignments.push(format!(
                    "{}={}",
                    self.creator.create_field_name_simple(persistence),
                    value
                ));
            }
            if assignments.is_empty() {
                return Err(QueryConstructionError::EmptyUpdate);
            }

            fragments
                .add(format!("UPDATE {}", self.creator.create_object_name_for(target)))
                .add("SET")
                .add_comma_delimited(&assignments, false);
            if let Some(relations) = relations.filter(|r| !r.is_empty()) {
                fragments.add(format!("FROM {}", relations.to_query_text(&mut renderer)?));
            }
            if let Some(filter) = filter {
                add_where(&mut fragments, &mut renderer, filter)?;
            }
        }

        let query = ActionQuery {
            command: finish_command(fragments.render(), parameters),
            ..ActionQuery::default()
        };
        log::trace!("create_update: Method Exit");
        Ok(query)
    }

    /// Delete from `target`, optionally joined through `relations`
    pub fn create_delete(
        &self,
        target: &ElementRef,
        filter: Option<&Predicate>,
        relations: Option<&RelationCollection>,
    ) -> Result<ActionQuery, QueryConstructionError> {
        log::trace!("create_delete: Method Enter");
        let mut parameters = ParameterCollector::new();
        let mut fragments = QueryFragments::new();
        {
            let mut renderer = self.renderer(&mut parameters);
            fragments.add(format!(
                "DELETE FROM {}",
                self.creator.create_object_name(&target.schema, &target.name)
            ));
            if let Some(relations) = relations.filter(|r| !r.is_empty()) {
                fragments.add(format!("FROM {}", relations.to_query_text(&mut renderer)?));
            }
            if let Some(filter) = filter {
                add_where(&mut fragments, &mut renderer, filter)?;
            }
        }

        let query = ActionQuery {
            command: finish_command(fragments.render(), parameters),
            ..ActionQuery::default()
        };
        log::trace!("create_delete: Method Exit");
        Ok(query)
    }

    /// Select limited to `request.max_rows` rows
    pub fn create_select(&self, request: &SelectRequest) -> Result<RetrievalQuery, QueryConstructionError> {
        log::trace!("create_select: Method Enter");
        let mut parameters = ParameterCollector::new();
        let statement = self.build_select(request, request.max_rows, &mut parameters)?;
        let query = statement.finish(parameters);
        log::trace!("create_select: Method Exit");
        Ok(query)
    }

    /// Select of one page. Without rows to skip this is a plain select of
    /// `rows_to_take` rows.
    pub fn create_paging_select(
        &self,
        request: &SelectRequest,
        rows_to_skip: usize,
        rows_to_take: usize,
    ) -> Result<RetrievalQuery, QueryConstructionError> {
        log::trace!("create_paging_select: Method Enter");
        let mut parameters = ParameterCollector::new();
        if rows_to_skip == 0 {
            let statement = self.build_select(request, rows_to_take, &mut parameters)?;
            return Ok(statement.finish(parameters));
        }

        let mut statement = self.build_select(request, 0, &mut parameters)?;
        if statement.query.requires_client_side_distinct_filtering {
            statement.query.requires_client_side_paging = true;
            statement.query.manual_rows_to_skip = rows_to_skip;
            statement.query.manual_rows_to_take = rows_to_take;
        } else {
            if rows_to_take > 0 {
                statement
                    .fragments
                    .fill(statement.top, format!("TOP {}", rows_to_take));
            }
            statement
                .fragments
                .fill(statement.paging, format!("START AT {}", rows_to_skip.saturating_add(1)));
        }
        let query = statement.finish(parameters);
        log::trace!("create_paging_select: Method Exit");
        Ok(query)
    }

    fn build_select(
        &self,
        request: &SelectRequest,
        max_rows: usize,
        parameters: &mut ParameterCollector,
    ) -> Result<SelectStatement, QueryConstructionError> {
        if request.select_list.is_empty() {
            return Err(QueryConstructionError::EmptySelectList);
        }
        let mut renderer = self.renderer(parameters);
        let mut query = RetrievalQuery::default();
        let mut fragments = QueryFragments::new();
        fragments.add("SELECT");
        let distinct = fragments.add_slot();
        let top = fragments.add_slot();
        let paging = fragments.add_slot();

        let mut projection = Vec::with_capacity(request.select_list.len());
        let mut names_in_select_list = Vec::with_capacity(request.select_list.len());
        let mut aliases: Vec<&str> = Vec::new();
        let mut large_object_projected = false;
        let mut primary_key_seen = false;

        for field in &request.select_list {
            let text = renderer.field(field, true)?;
            let mut item = text.clone();
            if let Some(alias) = field.alias.as_deref().filter(|a| !a.is_empty()) {
                aliases.push(alias);
                let column = field.persistence.as_ref().map(|p| p.source_column_name.as_str());
                if !field.is_plain_column() || column != Some(alias) {
                    item = format!("{} AS {}", item, self.creator.create_valid_alias(alias));
                }
            }
            if field.aggregate.is_none() && field.db_type().is_some_and(|t| t.is_large_object()) {
                large_object_projected = true;
            }
            if field.is_primary_key && field.is_plain_column() {
                primary_key_seen = true;
            }
            names_in_select_list.push(text);
            projection.push(item);
        }
        fragments.add_comma_delimited(&projection, false);

        let mut sort_items = Vec::with_capacity(request.sort_clauses.len());
        let mut sort_fields_projected = true;
        for clause in &request.sort_clauses {
            let text = renderer.field(&clause.field, true)?;
            let by_alias = clause
                .field
                .alias
                .as_deref()
                .is_some_and(|a| aliases.contains(&a));
            if !by_alias && !names_in_select_list.contains(&text) {
                sort_fields_projected = false;
            }
            let direction = match clause.direction {
                SortDirection::Ascending => "ASC",
                SortDirection::Descending => "DESC",
            };
            sort_items.push(format!("{} {}", text, direction));
        }

        let could_contain_duplicates = request.relations.may_produce_duplicates() || !primary_key_seen;
        let distinct_emitted = if request.allow_duplicates || !could_contain_duplicates {
            false
        } else if large_object_projected || !sort_fields_projected {
            query.requires_client_side_distinct_filtering = true;
            false
        } else {
            fragments.fill(distinct, "DISTINCT");
            true
        };

        if max_rows > 0 {
            if distinct_emitted
                || !could_contain_duplicates
                || request.has_group_by()
                || request.allow_duplicates
            {
                fragments.fill(top, format!("TOP {}", max_rows));
            } else {
                query.requires_client_side_limitation = true;
                query.manual_rows_to_take = max_rows;
            }
        }

        if !request.relations.is_empty() {
            fragments.add(format!("FROM {}", request.relations.to_query_text(&mut renderer)?));
        } else if let Some(field) = request.select_list.iter().find(|f| f.persistence.is_some()) {
            let mut from = format!("FROM {}", self.creator.create_object_name_for(persistence_of(field)?));
            if let Some(alias) = field.object_alias.as_deref().filter(|a| !a.is_empty()) {
                from.push(' ');
                from.push_str(&self.creator.create_valid_alias(alias));
            }
            fragments.add(from);
        }

        if let Some(filter) = &request.filter {
            add_where(&mut fragments, &mut renderer, filter)?;
        }

        if let Some(group_by) = request.group_by.as_ref().filter(|g| !g.is_empty()) {
            let mut names = Vec::with_capacity(group_by.fields.len());
            for field in &group_by.fields {
                names.push(renderer.field(field, false)?);
            }
            fragments.add(format!("GROUP BY {}", names.join(", ")));
            if let Some(having) = &group_by.having {
                let text = renderer.predicate(having)?;
                if !text.is_empty() {
                    fragments.add(format!("HAVING {}", text));
                }
            }
        }

        if !sort_items.is_empty() {
            fragments.add(format!("ORDER BY {}", sort_items.join(", ")));
        }

        Ok(SelectStatement {
            fragments,
            top,
            paging,
            query,
        })
    }
}

fn add_where(
    fragments: &mut QueryFragments,
    renderer: &mut SqlRenderer<'_>,
    filter: &Predicate,
) -> Result<(), QueryConstructionError> {
    let text = renderer.predicate(filter)?;
    if !text.is_empty() {
        fragments.add(format!("WHERE {}", text));
    }
    Ok(())
}
