//! Integration tests for the dynamic query engine
//!
//! Every test builds the query model through the public API and checks the
//! generated SQL Anywhere text and its anonymous parameter list.

use std::sync::Arc;

use pretty_assertions::assert_eq;

use rust_sqlanywhere::model::ElementRef;
use rust_sqlanywhere::query::{
    make_parameters_anonymous, AggregateFunction, ArithmeticOperator, ComparisonOperator, DeclaringType,
    EntityField, EntityRelation, Expression, FieldPersistenceInfo, GroupByClause, JoinHint,
    Predicate, RelationCollection, RelationEnd, RelationType, SchemaNameOverwrites, SortClause,
    SpecificCreator,
};
use rust_sqlanywhere::{
    AsaDbType, DynamicQueryEngine, Parameter, ParameterDirection, QueryConstructionError,
    SelectRequest, Value,
};

/// Helper to create an engine that ignores any installed overwrites
fn engine() -> DynamicQueryEngine {
    DynamicQueryEngine::with_creator(SpecificCreator::with_global_overwrites(Arc::new(
        SchemaNameOverwrites::default(),
    )))
}

/// Helper to build an overwrite table
fn overwrites(pairs: &[(&str, &str)]) -> SchemaNameOverwrites {
    let mut builder = SchemaNameOverwrites::builder();
    for (key, value) in pairs {
        builder.add(*key, *value);
    }
    builder.freeze()
}

fn customer(column: &str, db_type: AsaDbType) -> EntityField {
    EntityField::new(column, FieldPersistenceInfo::new("DBA", "customer", column, db_type))
}

fn order(column: &str, db_type: AsaDbType) -> EntityField {
    EntityField::new(column, FieldPersistenceInfo::new("DBA", "order", column, db_type))
}

fn customer_id() -> EntityField {
    EntityField::new(
        "id",
        FieldPersistenceInfo::new("DBA", "customer", "id", AsaDbType::Integer)
            .not_null()
            .identity("@@IDENTITY"),
    )
    .primary_key()
}

fn customer_orders() -> EntityRelation {
    EntityRelation::new(
        RelationEnd::new("DBA", "customer"),
        RelationEnd::new("DBA", "order"),
        RelationType::OneToMany,
    )
    .on("id", "cust_id")
}

// ============================================================================
// Insert
// ============================================================================

#[test]
fn test_insert_reads_back_identity() {
    let fields = vec![
        customer_id(),
        EntityField::new(
            "name",
            FieldPersistenceInfo::new("DBA", "customer", "name", AsaDbType::VarChar)
                .with_length(40)
                .not_null(),
        )
        .changed("Acme"),
    ];
    let query = engine().create_insert(&fields).unwrap();

    assert_eq!(query.sql(), "INSERT INTO [DBA].[customer] ([name]) VALUES (?)");
    let parameter = &query.command.parameters[0];
    assert_eq!(parameter.db_type, Some(AsaDbType::VarChar));
    assert_eq!(parameter.size, 40);
    assert!(!parameter.is_nullable);
    assert_eq!(parameter.value, Value::from("Acme"));

    assert_eq!(query.sequence_retrieval_queries.len(), 1);
    let sequence = &query.sequence_retrieval_queries[0];
    assert_eq!(sequence.command.text, "SELECT @@IDENTITY");
    assert!(!sequence.execute_before_main);
    assert_eq!(sequence.sequence_parameter.direction, ParameterDirection::InputOutput);

    assert_eq!(query.parameter_field_relations.len(), 1);
    assert_eq!(query.parameter_field_relations[0].field_name, "id");
    assert_eq!(
        query.parameter_field_relations[0].parameter_name,
        sequence.sequence_parameter.name
    );
}

#[test]
fn test_insert_of_identity_only_uses_empty_values() {
    let query = engine().create_insert(&[customer_id()]).unwrap();

    assert_eq!(query.sql(), "INSERT INTO [DBA].[customer] VALUES ()");
    assert!(query.command.parameters.is_empty());
    assert_eq!(query.sequence_retrieval_queries.len(), 1);
}

#[test]
fn test_insert_without_changes_fails() {
    let fields = vec![
        customer("name", AsaDbType::VarChar),
        customer("created", AsaDbType::DateTime).read_only().changed("x"),
    ];
    let err = engine().create_insert(&fields).unwrap_err();
    assert_eq!(err, QueryConstructionError::EmptyInsert);

    let err = engine().create_insert(&[]).unwrap_err();
    assert_eq!(err, QueryConstructionError::EmptyInsert);
}

// ============================================================================
// Update and delete
// ============================================================================

#[test]
fn test_update_through_relation() {
    let fields = vec![customer("rating", AsaDbType::Integer).changed(5)];
    let filter = Predicate::compare(
        order("amount", AsaDbType::Numeric),
        ComparisonOperator::GreaterThan,
        100,
    );
    let relations = RelationCollection::new().with(customer_orders());

    let query = engine()
        .create_update(&fields, Some(&filter), Some(&relations))
        .unwrap();

    assert_eq!(
        query.sql(),
        "UPDATE [DBA].[customer] SET [rating]=? \
         FROM [DBA].[customer] INNER JOIN [DBA].[order] ON [DBA].[customer].[id]=[DBA].[order].[cust_id] \
         WHERE [DBA].[order].[amount] > ?"
    );
    let values: Vec<&Value> = query.command.parameters.iter().map(|p| &p.value).collect();
    assert_eq!(values, vec![&Value::Int32(5), &Value::Int32(100)]);
    assert_eq!(query.command.parameters[1].db_type, Some(AsaDbType::Numeric));
}

#[test]
fn test_update_with_expression_value() {
    let rating = customer("rating", AsaDbType::Integer);
    let incremented = Expression::arithmetic(
        Expression::Field(rating.clone()),
        ArithmeticOperator::Add,
        Expression::Value(Value::from(1)),
    );
    let fields = vec![rating.with_expression(incremented).changed(Value::Null)];

    let query = engine().create_update(&fields, None, None).unwrap();
    assert_eq!(
        query.sql(),
        "UPDATE [DBA].[customer] SET [rating]=([DBA].[customer].[rating] + ?)"
    );
}

#[test]
fn test_delete_with_negated_in_list() {
    let filter = Predicate::In {
        field: Expression::Field(customer("id", AsaDbType::Integer)),
        values: vec![Value::from(1), Value::from(2)],
        negate: true,
    };
    let query = engine()
        .create_delete(&ElementRef::new("DBA", "customer"), Some(&filter), None)
        .unwrap();

    assert_eq!(
        query.sql(),
        "DELETE FROM [DBA].[customer] WHERE [DBA].[customer].[id] NOT IN (?, ?)"
    );
    assert_eq!(query.command.parameters.len(), 2);
}

#[test]
fn test_delete_with_empty_in_list() {
    let filter = Predicate::In {
        field: Expression::Field(customer("id", AsaDbType::Integer)),
        values: vec![],
        negate: true,
    };
    let query = engine()
        .create_delete(&ElementRef::new("DBA", "customer"), Some(&filter), None)
        .unwrap();
    assert_eq!(query.sql(), "DELETE FROM [DBA].[customer] WHERE 1=1");
}

// ============================================================================
// Select: DISTINCT and TOP
// ============================================================================

#[test]
fn test_select_over_one_to_many_relation_is_distinct() {
    let request = SelectRequest::new(vec![
        customer_id().with_object_alias("c"),
        customer("name", AsaDbType::VarChar).with_object_alias("c"),
        order("amount", AsaDbType::Numeric).with_object_alias("o"),
    ])
    .with_relations(
        RelationCollection::new().with(
            EntityRelation::new(
                RelationEnd::new("DBA", "customer").with_alias("c"),
                RelationEnd::new("DBA", "order").with_alias("o"),
                RelationType::OneToMany,
            )
            .on("id", "cust_id")
            .with_join_hint(JoinHint::Left),
        ),
    )
    .with_max_rows(25);

    let query = engine().create_select(&request).unwrap();
    assert_eq!(
        query.sql(),
        "SELECT DISTINCT TOP 25 [c].[id], [c].[name], [o].[amount] \
         FROM [DBA].[customer] [c] LEFT JOIN [DBA].[order] [o] ON [c].[id]=[o].[cust_id]"
    );
    assert!(!query.requires_client_side_distinct_filtering);
    assert!(!query.requires_client_side_limitation);
}

#[test]
fn test_large_object_forces_client_side_filtering() {
    let request = SelectRequest::new(vec![
        customer("name", AsaDbType::VarChar),
        customer("notes", AsaDbType::LongVarChar),
    ])
    .with_max_rows(10);

    let query = engine().create_select(&request).unwrap();
    assert_eq!(
        query.sql(),
        "SELECT [DBA].[customer].[name], [DBA].[customer].[notes] FROM [DBA].[customer]"
    );
    assert!(query.requires_client_side_distinct_filtering);
    assert!(query.requires_client_side_limitation);
    assert_eq!(query.manual_rows_to_take, 10);
}

#[test]
fn test_sort_on_unprojected_field_forces_client_side_filtering() {
    let request = SelectRequest::new(vec![customer("name", AsaDbType::VarChar)])
        .order_by(SortClause::descending(customer("rating", AsaDbType::Integer)))
        .with_max_rows(3);

    let query = engine().create_select(&request).unwrap();
    assert_eq!(
        query.sql(),
        "SELECT [DBA].[customer].[name] FROM [DBA].[customer] ORDER BY [DBA].[customer].[rating] DESC"
    );
    assert!(query.requires_client_side_distinct_filtering);
    assert!(query.requires_client_side_limitation);
}

#[test]
fn test_allow_duplicates_keeps_top() {
    let request = SelectRequest::new(vec![customer("notes", AsaDbType::LongVarChar)])
        .with_max_rows(3)
        .allowing_duplicates();

    let query = engine().create_select(&request).unwrap();
    assert_eq!(
        query.sql(),
        "SELECT TOP 3 [DBA].[customer].[notes] FROM [DBA].[customer]"
    );
    assert!(!query.requires_client_side_distinct_filtering);
    assert!(!query.requires_client_side_limitation);
}

#[test]
fn test_group_by_with_having() {
    let orders = order("id", AsaDbType::Integer)
        .with_aggregate(AggregateFunction::CountBig)
        .with_alias("Orders");
    let request = SelectRequest::new(vec![order("cust_id", AsaDbType::Integer), orders.clone()])
        .with_group_by(
            GroupByClause::new(vec![order("cust_id", AsaDbType::Integer)]).with_having(
                Predicate::compare(orders, ComparisonOperator::GreaterThan, 1),
            ),
        )
        .with_max_rows(5);

    let query = engine().create_select(&request).unwrap();
    assert_eq!(
        query.sql(),
        "SELECT DISTINCT TOP 5 [DBA].[order].[cust_id], COUNT([DBA].[order].[id]) AS [Orders] \
         FROM [DBA].[order] GROUP BY [DBA].[order].[cust_id] HAVING COUNT([DBA].[order].[id]) > ?"
    );
    assert_eq!(query.command.parameters.len(), 1);
    assert_eq!(query.command.parameters[0].db_type, Some(AsaDbType::Integer));
}

// ============================================================================
// Paging
// ============================================================================

#[test]
fn test_paging_uses_top_and_start_at() {
    let request = SelectRequest::new(vec![customer_id(), customer("name", AsaDbType::VarChar)])
        .order_by(SortClause::ascending(customer("name", AsaDbType::VarChar)));

    let query = engine().create_paging_select(&request, 5, 20).unwrap();
    assert_eq!(
        query.sql(),
        "SELECT TOP 20 START AT 6 [DBA].[customer].[id], [DBA].[customer].[name] \
         FROM [DBA].[customer] ORDER BY [DBA].[customer].[name] ASC"
    );
    assert!(!query.requires_client_side_paging);
}

#[test]
fn test_paging_after_distinct() {
    let request = SelectRequest::new(vec![customer("name", AsaDbType::VarChar)])
        .order_by(SortClause::ascending(customer("name", AsaDbType::VarChar)));

    let query = engine().create_paging_select(&request, 5, 20).unwrap();
    assert_eq!(
        query.sql(),
        "SELECT DISTINCT TOP 20 START AT 6 [DBA].[customer].[name] \
         FROM [DBA].[customer] ORDER BY [DBA].[customer].[name] ASC"
    );
    assert!(!query.requires_client_side_paging);
    assert!(!query.requires_client_side_distinct_filtering);
}

#[test]
fn test_first_page_is_a_limited_select() {
    let request = SelectRequest::new(vec![customer_id(), customer("name", AsaDbType::VarChar)]);

    let paged = engine().create_paging_select(&request, 0, 20).unwrap();
    let limited = engine()
        .create_select(&request.clone().with_max_rows(20))
        .unwrap();
    assert_eq!(paged.sql(), limited.sql());
    assert_eq!(
        paged.sql(),
        "SELECT TOP 20 [DBA].[customer].[id], [DBA].[customer].[name] FROM [DBA].[customer]"
    );
}

#[test]
fn test_paging_falls_back_to_client_side() {
    let request = SelectRequest::new(vec![
        customer("name", AsaDbType::VarChar),
        customer("notes", AsaDbType::LongVarChar),
    ]);

    let query = engine().create_paging_select(&request, 10, 5).unwrap();
    assert_eq!(
        query.sql(),
        "SELECT [DBA].[customer].[name], [DBA].[customer].[notes] FROM [DBA].[customer]"
    );
    assert!(query.requires_client_side_paging);
    assert!(query.requires_client_side_distinct_filtering);
    assert_eq!(query.manual_rows_to_skip, 10);
    assert_eq!(query.manual_rows_to_take, 5);
}

// ============================================================================
// Parameters
// ============================================================================

#[test]
fn test_parameters_follow_placeholder_order() {
    let filter = Predicate::between(customer("rating", AsaDbType::Integer), 1, 5)
        .and(Predicate::like(customer("name", AsaDbType::VarChar), "A%"));
    let request = SelectRequest::new(vec![customer_id()]).with_filter(filter);

    let query = engine().create_select(&request).unwrap();
    assert_eq!(
        query.sql(),
        "SELECT [DBA].[customer].[id] FROM [DBA].[customer] \
         WHERE ([DBA].[customer].[rating] BETWEEN ? AND ? AND [DBA].[customer].[name] LIKE ?)"
    );
    let values: Vec<&Value> = query.command.parameters.iter().map(|p| &p.value).collect();
    assert_eq!(
        values,
        vec![&Value::Int32(1), &Value::Int32(5), &Value::from("A%")]
    );
    assert_eq!(query.command.parameters[2].db_type, Some(AsaDbType::VarChar));
}

#[test]
fn test_anonymization_skips_literals_and_system_variables() {
    let parameters = vec![
        Parameter::input("@p1", 1),
        Parameter::input("@p2", 2),
        Parameter::input("@p3", 3),
    ];
    let (text, ordered) = make_parameters_anonymous(
        "SELECT [@p3] FROM t WHERE a = @P2 AND b = @p1 AND c = '@p1' AND d = @@IDENTITY",
        &parameters,
    );

    assert_eq!(
        text,
        "SELECT [@p3] FROM t WHERE a = ? AND b = ? AND c = '@p1' AND d = @@IDENTITY"
    );
    let names: Vec<&str> = ordered.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["@p2", "@p1"]);
}

#[test]
fn test_null_comparison_needs_no_parameter() {
    let request = SelectRequest::new(vec![customer_id()]).with_filter(Predicate::eq(
        customer("name", AsaDbType::VarChar),
        Value::Null,
    ));
    let query = engine().create_select(&request).unwrap();
    assert_eq!(
        query.sql(),
        "SELECT [DBA].[customer].[id] FROM [DBA].[customer] WHERE [DBA].[customer].[name] IS NULL"
    );
    assert!(query.command.parameters.is_empty());
}

// ============================================================================
// Function mappings
// ============================================================================

#[test]
fn test_function_call_in_filter() {
    let substring = Expression::call(
        DeclaringType::String,
        "Substring",
        Some(Expression::Field(customer("name", AsaDbType::VarChar))),
        vec![Expression::Value(Value::from(0)), Expression::Value(Value::from(3))],
    );
    let year = Expression::call(
        DeclaringType::DateTime,
        "get_Year",
        Some(Expression::Field(customer("created", AsaDbType::DateTime))),
        vec![],
    );
    let filter = Predicate::Compare {
        left: substring,
        operator: ComparisonOperator::Equal,
        right: Expression::Value(Value::from("Acm")),
    }
    .and(Predicate::Compare {
        left: year,
        operator: ComparisonOperator::GreaterEqual,
        right: Expression::Value(Value::from(2020)),
    });
    let request = SelectRequest::new(vec![customer_id()]).with_filter(filter);

    let query = engine().create_select(&request).unwrap();
    assert_eq!(
        query.sql(),
        "SELECT [DBA].[customer].[id] FROM [DBA].[customer] \
         WHERE (SUBSTRING([DBA].[customer].[name], ?+1, ?) = ? AND YEAR([DBA].[customer].[created]) >= ?)"
    );
    assert_eq!(query.command.parameters.len(), 4);
    assert_eq!(query.command.parameters[3].value, Value::Int32(2020));
}

#[test]
fn test_unknown_function_mapping() {
    let sqrt = Expression::call(
        DeclaringType::Math,
        "Sqrt",
        None,
        vec![Expression::Field(customer("rating", AsaDbType::Integer))],
    );
    let request = SelectRequest::new(vec![customer_id()]).with_filter(Predicate::Compare {
        left: sqrt,
        operator: ComparisonOperator::LesserThan,
        right: Expression::Value(Value::from(3)),
    });

    let err = engine().create_select(&request).unwrap_err();
    assert_eq!(
        err,
        QueryConstructionError::UnknownFunctionMapping {
            declaring_type: "System.Math".to_string(),
            method: "Sqrt".to_string(),
            arity: 1,
        }
    );
}

// ============================================================================
// Schema name overwrites
// ============================================================================

#[test]
fn test_per_call_overwrites_apply_before_global() {
    let engine = DynamicQueryEngine::with_creator(SpecificCreator::with_global_overwrites(
        Arc::new(overwrites(&[("prod", "archive")])),
    ))
    .with_per_call_overwrites(overwrites(&[("DBA", "prod")]));

    let query = engine
        .create_delete(&ElementRef::new("DBA", "customer"), None, None)
        .unwrap();
    assert_eq!(query.sql(), "DELETE FROM [archive].[customer]");
}

#[test]
fn test_wildcard_and_empty_overwrites() {
    let wildcard = engine().with_per_call_overwrites(overwrites(&[("*", "sales"), ("DBA", "x")]));
    let query = wildcard
        .create_select(&SelectRequest::new(vec![customer_id()]))
        .unwrap();
    assert_eq!(
        query.sql(),
        "SELECT [sales].[customer].[id] FROM [sales].[customer]"
    );

    let unqualified = engine().with_per_call_overwrites(overwrites(&[("DBA", "")]));
    let query = unqualified
        .create_delete(&ElementRef::new("DBA", "customer"), None, None)
        .unwrap();
    assert_eq!(query.sql(), "DELETE FROM [customer]");
}

#[test]
fn test_stored_procedure_names() {
    let creator = SpecificCreator::with_global_overwrites(Arc::new(overwrites(&[(
        "prod", "archive",
    )])))
    .with_per_call_overwrites(overwrites(&[("DBA", "prod")]));

    assert_eq!(creator.create_stored_procedure_name("DBA.get_orders"), "archive.get_orders");
    assert_eq!(
        creator.create_stored_procedure_name("[DBA].[get orders]"),
        "archive.[get orders]"
    );
    assert_eq!(creator.create_stored_procedure_name("get_orders"), "get_orders");
}
