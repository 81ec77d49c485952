use std::fmt::Write;
use tokio_postgres::types::ToSql;
use topics_core::list_filter::TopicListCriteria;
use topics_core::model::Counter;

pub const CREATE_TABLE: &str = "create table if not exists topics (
    id serial primary key,
    title text not null,
    category varchar(100),
    keywords text,
    content text,
    preview text,
    author varchar(255) default 'Anonymous',
    created_date timestamptz not null default now(),
    views integer not null default 0,
    helpful integer not null default 0
)";

const TOPIC_COLUMNS: &str =
    "id, title, category, keywords, content, preview, author, created_date, views, helpful";

pub const GET: &str = "select id, title, category, keywords, content, preview, author, created_date, views, helpful from topics where id = $1";

pub const CREATE: &str = "insert into topics (title, category, keywords, content, preview, author) values ($1, $2, $3, $4, $5, $6) returning id";

pub const REPLACE: &str = "update topics set title = $1, category = $2, keywords = $3, preview = $4, content = $5, author = $6 where id = $7";

const INCREMENT_VIEWS: &str = "update topics set views = views + 1 where id = $1";
const INCREMENT_HELPFUL: &str = "update topics set helpful = helpful + 1 where id = $1";

pub const DELETE: &str = "delete from topics where id = $1";

pub const CATEGORY_COUNTS: &str = "select category, count(*) as count from topics group by category order by count desc, category asc";

/// The counter is bumped by the database itself so concurrent increments never lose an update.
pub fn increment(counter: Counter) -> &'static str {
    match counter {
        Counter::Views => INCREMENT_VIEWS,
        Counter::Helpful => INCREMENT_HELPFUL,
    }
}

type Param = Box<dyn ToSql + Send + Sync>;

/// A list statement assembled from whichever filters are present, with numbered parameters.
pub struct ListQuery {
    pub query: String,
    params: Vec<Param>,
}

impl ListQuery {
    pub fn build(criteria: &TopicListCriteria) -> Self {
        let mut params: Vec<Param> = Vec::with_capacity(3);
        let mut conditions = Vec::with_capacity(2);

        if let Some(search) = criteria.search() {
            params.push(Box::new(format!("%{search}%")));
            let n = params.len();
            conditions.push(format!(
                "(title ilike ${n} or keywords ilike ${n} or content ilike ${n})"
            ));
        }

        if let Some(category) = criteria.category() {
            params.push(Box::new(category.to_string()));
            conditions.push(format!("category = ${}", params.len()));
        }

        let mut query = format!("select {TOPIC_COLUMNS} from topics");
        if !conditions.is_empty() {
            query.push_str(" where ");
            query.push_str(&conditions.join(" and "));
        }
        query.push_str(" order by created_date desc, id desc");

        // postgres parses the raw limit, non-numeric and negative values fail there
        if let Some(limit) = criteria.limit() {
            params.push(Box::new(limit.to_string()));
            write!(&mut query, " limit ${}::text::bigint", params.len()).expect("write to string");
        }

        Self { query, params }
    }

    pub fn params(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.params
            .iter()
            .map(|p| &**p as &(dyn ToSql + Sync))
            .collect()
    }
}
