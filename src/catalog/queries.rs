//! SQL Anywhere system catalog queries

/// Quote a value as a SQL string literal
fn literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

fn creator_clause(owner: &str) -> String {
    format!("(select user_id from sysuser where user_name={})", literal(owner))
}

pub const SCHEMA_NAMES: &str = "select name as SchemaName from sysusers where name not in ('SYS', 'dbo', 'PUBLIC', 'rs_systabgroup', 'SA_DEBUG')";

pub fn table_names(owner: &str) -> String {
    format!(
        "select table_name as ElementName, r.remarks from systab left join sysremark r on systab.object_id = r.object_id where table_type = 1 and creator = {}",
        creator_clause(owner)
    )
}

pub fn view_names(owner: &str) -> String {
    format!(
        "select table_name as ElementName, r.remarks from systab left join sysremark r on systab.object_id = r.object_id where table_type in (2, 21) and creator = {}",
        creator_clause(owner)
    )
}

pub fn stored_procedure_names(owner: &str) -> String {
    format!(
        "select proc_name As ElementName, remarks from sysprocedure where creator = {}",
        creator_clause(owner)
    )
}

/// Columns of one table or view; one `?` placeholder for the table name
pub fn fields(owner: &str) -> String {
    format!(
        "select tc.*, d.domain_name, d.[precision], r.remarks from systabcol tc inner join sysdomain d on tc.domain_id = d.domain_id left join sysremark r on tc.object_id = r.object_id where table_id = (select table_id from systab where table_name = ? and creator = {}) order by tc.column_id asc",
        creator_clause(owner)
    )
}

pub const PRIMARY_KEY_PROCEDURE: &str = "sp_pkeys";

/// Unique index columns of one table; one `?` placeholder for the table name
pub fn unique_constraints(owner: &str) -> String {
    format!(
        "select i.index_name, tc.column_name from sysidx i inner join sysidxcol ic on i.table_id=ic.table_id and i.index_id=ic.index_id inner join systabcol tc on ic.table_id = tc.table_id and ic.column_id = tc.column_id where i.table_id in ( select table_id from systab where creator = {} and table_name=? ) AND i.[unique] in (1, 2) AND i.index_category=3",
        creator_clause(owner)
    )
}

/// Parameters and return value of one procedure; one `?` placeholder for the procedure name
pub fn procedure_parameters(owner: &str) -> String {
    format!(
        "select pp.*, d.domain_name, d.[precision] from sysprocparm pp inner join sysprocedure p on pp.proc_id = p.proc_id inner join sysdomain d on pp.domain_id = d.domain_id where pp.parm_type in (0, 4) and p.proc_name = ? and p.creator = {} order by pp.parm_id ASC",
        creator_clause(owner)
    )
}

/// Foreign key column pairs between the given schemas
pub fn foreign_keys<S: AsRef<str>>(owners: &[S]) -> String {
    let in_clause = owners
        .iter()
        .map(|o| literal(o.as_ref()))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "select fks.user_name AS FK_SCHEMA, fkt.table_name as FK_TABLE_NAME, fcol.column_name AS FK_COLUMN_NAME, \
         pks.user_name AS PK_SCHEMA, pkt.table_name as PK_TABLE_NAME, pcol.column_name AS PK_COLUMN_NAME, sc.constraint_name as FK_NAME \
         from sysfkey fk inner join systab fkt on fk.foreign_table_id = fkt.table_id \
         inner join systab pkt on fk.primary_table_id = pkt.table_id \
         inner join sysuser fks on fkt.creator = fks.user_id \
         inner join sysuser pks on pkt.creator = pks.user_id \
         inner join sysidxcol fic on fic.table_id = fk.foreign_table_id and fic.index_id = fk.foreign_index_id \
         inner join sysidxcol pic on pic.table_id = fk.primary_table_id and pic.index_id = fk.primary_index_id and fic.primary_column_id = pic.column_id \
         inner join syscolumn fcol on fic.table_id=fcol.table_id and fic.column_id = fcol.column_id \
         inner join syscolumn pcol on pic.table_id=pcol.table_id and pic.column_id = pcol.column_id \
         inner join sysidx si on si.table_id = fk.foreign_table_id and si.index_id = fk.foreign_index_id and si.index_category=2 \
         inner join sysconstraint sc on sc.ref_object_id=si.object_id \
         where fks.user_name in ({0}) and pks.user_name in ({0}) \
         order BY fks.user_name ASC, fkt.table_name ASC, fic.column_id ASC",
        in_clause
    )
}
