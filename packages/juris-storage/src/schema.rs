pub fn render_schema() -> String {
	expand_includes(include_str!("../../../sql/init.sql"))
}

fn expand_includes(sql: &str) -> String {
	let mut out = String::new();

	for line in sql.lines() {
		let trimmed = line.trim();

		if let Some(path) = trimmed.strip_prefix("\\ir ") {
			match path.trim() {
				"tables/001_cases.sql" =>
					out.push_str(include_str!("../../../sql/tables/001_cases.sql")),
				other => tracing::warn!(include = other, "Unknown schema include skipped."),
			}

			out.push('\n');

			continue;
		}

		out.push_str(line);
		out.push('\n');
	}

	out
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn expands_case_table_include() {
		let sql = render_schema();

		assert!(sql.contains("CREATE TABLE IF NOT EXISTS cases"));
		assert!(!sql.contains("\\ir"));
	}
}
