//! CLI Argument Converter
//!
//! Turns the raw token groups collected by clap into filter JSON and search
//! requests, running each group through its parameter type.

use log::{debug, info};
use serde_json::Value;
use thiserror::Error;

use super::args::{FilterArgs, RequestArgs};
use super::param_type::{ParamError, ParamType, ParamValue};
use super::vocabulary::LenientChoice;
use crate::config::SearchDefaults;
use crate::filters;

/// CLI conversion errors
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Invalid value for '{option}': {source}")]
    Param {
        option: &'static str,
        source: ParamError,
    },

    #[error("No item types given: use --item-type or set item-types in the [search] config section")]
    MissingItemTypes,
}

/// Convert every occurrence of one option, in command-line order
fn convert_occurrences(
    option: &'static str,
    param: ParamType,
    tokens: &[String],
) -> Result<Vec<ParamValue>, CliError> {
    tokens
        .chunks(param.arity())
        .map(|group| {
            param
                .convert(group)
                .map_err(|source| CliError::Param { option, source })
        })
        .collect()
}

/// Filter JSON contributed by the filter options, in a stable order:
/// dates, ranges, string lists, number lists, geometry, raw filter
pub fn args_to_filters(args: &FilterArgs) -> Result<Vec<Value>, CliError> {
    let mut values = Vec::new();
    values.extend(convert_occurrences("--date", ParamType::date_range(), &args.date)?);
    values.extend(convert_occurrences("--range", ParamType::range(), &args.range)?);
    values.extend(convert_occurrences("--string-in", ParamType::string_in(), &args.string_in)?);
    values.extend(convert_occurrences("--number-in", ParamType::number_in(), &args.number_in)?);
    if let Some(geom) = &args.geom {
        values.extend(convert_occurrences("--geom", ParamType::geom(), std::slice::from_ref(geom))?);
    }
    if let Some(filter) = &args.filter_json {
        values.extend(convert_occurrences("--filter-json", ParamType::filter(), std::slice::from_ref(filter))?);
    }

    let filters: Vec<Value> = values
        .into_iter()
        .flat_map(ParamValue::into_filter_values)
        .collect();
    debug!("Filter options contributed {} fragment(s)", filters.len());
    Ok(filters)
}

/// Combine fragments: one stands alone, several (or none) are AND-ed
pub fn combine_filters(mut fragments: Vec<Value>) -> Value {
    if fragments.len() == 1 {
        fragments.remove(0)
    } else {
        filters::and_filter(fragments).to_value()
    }
}

/// Convert filter options to a single filter
pub fn args_to_filter(args: &FilterArgs) -> Result<Value, CliError> {
    Ok(combine_filters(args_to_filters(args)?))
}

/// Convert filter options for the `filter` subcommand.
///
/// With `any`, several fragments are OR-ed instead of AND-ed; with `negate`
/// the combined filter is wrapped in a `NotFilter`.
pub fn args_to_logical_filter(args: &FilterArgs, any: bool, negate: bool) -> Result<Value, CliError> {
    let fragments = args_to_filters(args)?;
    let combined = if any && fragments.len() != 1 {
        filters::or_filter(fragments).to_value()
    } else {
        combine_filters(fragments)
    };
    Ok(if negate {
        filters::not_filter(combined).to_value()
    } else {
        combined
    })
}

/// Resolve item-type arguments; the union is returned in vocabulary order
pub fn resolve_item_types(values: &[String]) -> Result<Vec<String>, CliError> {
    resolve_choices("--item-type", LenientChoice::item_type(), values)
}

/// Resolve asset-type arguments
pub fn resolve_asset_types(values: &[String]) -> Result<Vec<String>, CliError> {
    resolve_choices("--asset-type", LenientChoice::asset_type(), values)
}

fn resolve_choices(
    option: &'static str,
    choice: LenientChoice,
    values: &[String],
) -> Result<Vec<String>, CliError> {
    choice
        .convert_all(values)
        .map_err(|source| CliError::Param { option, source })
}

/// Download permission for each asset type
pub fn asset_permissions(asset_types: &[String]) -> Vec<String> {
    asset_types
        .iter()
        .map(|asset_type| format!("assets.{}:download", asset_type))
        .collect()
}

/// Convert `request` arguments to a search request body.
///
/// Command-line values take precedence over `defaults` from the
/// configuration file.
pub fn args_to_search_request(
    args: &RequestArgs,
    defaults: &SearchDefaults,
) -> Result<Value, CliError> {
    let item_args = if args.item_types.is_empty() {
        &defaults.item_types
    } else {
        &args.item_types
    };
    let item_types = resolve_item_types(item_args)?;
    if item_types.is_empty() {
        return Err(CliError::MissingItemTypes);
    }

    let mut fragments = args_to_filters(&args.filter)?;
    let asset_types = resolve_asset_types(&args.asset_types)?;
    if !asset_types.is_empty() {
        fragments.push(filters::permission_filter(asset_permissions(&asset_types)).to_value());
    }

    let name = args.name.as_deref().or(defaults.name.as_deref());
    let interval = args.interval.as_deref().or(defaults.interval.as_deref());

    info!("Search request for item types: {}", item_types.join(", "));
    Ok(filters::build_search_request(
        &combine_filters(fragments),
        &item_types,
        name,
        interval,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_no_options_is_empty_and_filter() {
        let filter = args_to_filter(&FilterArgs::default()).unwrap();
        assert_eq!(filter, json!({"type": "AndFilter", "config": []}));
    }

    #[test]
    fn test_single_option_stands_alone() {
        let args = FilterArgs {
            range: strings(&["cloud_cover", "lte", "0.5"]),
            ..FilterArgs::default()
        };
        let filter = args_to_filter(&args).unwrap();
        assert_eq!(filter["type"], "RangeFilter");
        assert_eq!(filter["config"], json!({"lte": 0.5}));
    }

    #[test]
    fn test_multiple_options_are_anded_in_order() {
        let args = FilterArgs {
            date: strings(&["acquired", "gt", "2017"]),
            range: strings(&["cloud_cover", "lt", "0.2", "gsd", "gte", "3"]),
            string_in: strings(&["satellite_id", "a b"]),
            ..FilterArgs::default()
        };
        let filter = args_to_filter(&args).unwrap();
        assert_eq!(filter["type"], "AndFilter");
        let config = filter["config"].as_array().unwrap();
        let kinds: Vec<&str> = config.iter().map(|f| f["type"].as_str().unwrap()).collect();
        assert_eq!(kinds, vec!["DateRangeFilter", "RangeFilter", "RangeFilter", "StringInFilter"]);
        assert_eq!(config[2]["field_name"], "gsd");
    }

    #[test]
    fn test_error_names_option() {
        let args = FilterArgs {
            range: strings(&["cloud_cover", "eq", "0.5"]),
            ..FilterArgs::default()
        };
        let err = args_to_filter(&args).unwrap_err();
        assert!(matches!(
            err,
            CliError::Param { option: "--range", source: ParamError::InvalidOperator { .. } }
        ));
        assert!(err.to_string().starts_with("Invalid value for '--range': invalid operator: eq."));
    }

    #[test]
    fn test_empty_geom_contributes_nothing() {
        let args = FilterArgs {
            geom: Some(String::new()),
            number_in: strings(&["gsd", "3,5"]),
            ..FilterArgs::default()
        };
        let filter = args_to_filter(&args).unwrap();
        assert_eq!(filter["type"], "NumberInFilter");
    }

    #[test]
    fn test_filter_json_list_is_flattened_into_and() {
        let args = FilterArgs {
            range: strings(&["cloud_cover", "lt", "0.2"]),
            filter_json: Some(
                r#"[{"type": "StringInFilter", "field_name": "satellite_id", "config": ["0c12"]}]"#.to_string(),
            ),
            ..FilterArgs::default()
        };
        let filter = args_to_filter(&args).unwrap();
        assert_eq!(
            filter,
            json!({
                "type": "AndFilter",
                "config": [
                    {"type": "RangeFilter", "field_name": "cloud_cover", "config": {"lt": 0.2}},
                    {"type": "StringInFilter", "field_name": "satellite_id", "config": ["0c12"]}
                ]
            })
        );
    }

    #[test]
    fn test_saved_request_filter_is_unwrapped() {
        let args = FilterArgs {
            range: strings(&["cloud_cover", "lt", "0.2"]),
            filter_json: Some(
                r#"{"item_types": ["REScene"], "filter": {"type": "NumberInFilter", "field_name": "gsd", "config": [3]}}"#
                    .to_string(),
            ),
            ..FilterArgs::default()
        };
        let filter = args_to_filter(&args).unwrap();
        let config = filter["config"].as_array().unwrap();
        assert_eq!(config.len(), 2);
        assert_eq!(config[1], json!({"type": "NumberInFilter", "field_name": "gsd", "config": [3]}));
        assert!(config.iter().all(|fragment| fragment.get("item_types").is_none()));
    }

    #[test]
    fn test_logical_filter_any_and_negate() {
        let args = FilterArgs {
            range: strings(&["cloud_cover", "lt", "0.2"]),
            string_in: strings(&["satellite_id", "0c12"]),
            ..FilterArgs::default()
        };
        let any = args_to_logical_filter(&args, true, false).unwrap();
        assert_eq!(any["type"], "OrFilter");
        assert_eq!(any["config"].as_array().unwrap().len(), 2);

        let none = args_to_logical_filter(&args, true, true).unwrap();
        assert_eq!(none["type"], "NotFilter");
        assert_eq!(none["config"], any);

        let single = FilterArgs {
            range: strings(&["cloud_cover", "lt", "0.2"]),
            ..FilterArgs::default()
        };
        assert_eq!(args_to_logical_filter(&single, true, false).unwrap()["type"], "RangeFilter");
        assert_eq!(
            args_to_logical_filter(&args, false, false).unwrap(),
            args_to_filter(&args).unwrap()
        );
    }

    #[test]
    fn test_resolve_item_types_union() {
        let types = resolve_item_types(&strings(&["landsat", "psscene*", "psscene4band"])).unwrap();
        assert_eq!(types, vec!["PSScene4Band", "PSScene3Band", "Landsat8L1G"]);
    }

    #[test]
    fn test_resolve_item_types_invalid() {
        let err = resolve_item_types(&strings(&["nope"])).unwrap_err();
        assert!(matches!(
            err,
            CliError::Param { option: "--item-type", source: ParamError::InvalidChoice { .. } }
        ));
    }

    #[test]
    fn test_asset_permissions() {
        assert_eq!(
            asset_permissions(&strings(&["visual", "analytic"])),
            vec!["assets.visual:download", "assets.analytic:download"]
        );
    }

    #[test]
    fn test_search_request_full() {
        let args = RequestArgs {
            filter: FilterArgs {
                range: strings(&["cloud_cover", "lt", "0.1"]),
                ..FilterArgs::default()
            },
            item_types: strings(&["REOrthoTile"]),
            asset_types: strings(&["visual*"]),
            name: Some("low cloud".to_string()),
            interval: None,
        };
        let request = args_to_search_request(&args, &SearchDefaults::default()).unwrap();
        assert_eq!(request["item_types"], json!(["REOrthoTile"]));
        assert_eq!(request["name"], "low cloud");
        assert_eq!(request["filter"]["type"], "AndFilter");
        assert_eq!(
            request["filter"]["config"][1],
            json!({
                "type": "PermissionFilter",
                "config": ["assets.visual:download", "assets.visual_xml:download"]
            })
        );
    }

    #[test]
    fn test_search_request_uses_config_defaults() {
        let defaults = SearchDefaults {
            item_types: strings(&["psscene*"]),
            name: Some("nightly".to_string()),
            interval: Some("day".to_string()),
        };
        let request = args_to_search_request(&RequestArgs::default(), &defaults).unwrap();
        assert_eq!(request["item_types"], json!(["PSScene4Band", "PSScene3Band"]));
        assert_eq!(request["name"], "nightly");
        assert_eq!(request["interval"], "day");
    }

    #[test]
    fn test_search_request_cli_overrides_defaults() {
        let defaults = SearchDefaults {
            item_types: strings(&["psscene*"]),
            name: Some("nightly".to_string()),
            interval: None,
        };
        let args = RequestArgs {
            item_types: strings(&["all"]),
            name: Some("adhoc".to_string()),
            ..RequestArgs::default()
        };
        let request = args_to_search_request(&args, &defaults).unwrap();
        assert_eq!(request["item_types"].as_array().unwrap().len(), 7);
        assert_eq!(request["name"], "adhoc");
    }

    #[test]
    fn test_search_request_requires_item_types() {
        let err = args_to_search_request(&RequestArgs::default(), &SearchDefaults::default()).unwrap_err();
        assert!(matches!(err, CliError::MissingItemTypes));
    }
}
