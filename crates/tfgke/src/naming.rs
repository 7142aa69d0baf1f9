//! conversion between terraform schema names and binding accessor names
//!
//! The provider schema uses snake_case (`http_load_balancing`), the CDK bindings use camelCase
//! accessors (`httpLoadBalancing`). Both directions are lossless for schema names: lowercase
//! ascii letters, digits and single underscores.

/// `node_pool_auto_config` -> `nodePoolAutoConfig`
pub fn camel_case(snake: &str) -> String {
    let mut out = String::with_capacity(snake.len());
    let mut upper_next = false;
    for c in snake.chars() {
        if c == '_' {
            upper_next = true;
            continue;
        }

        if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// `nodePoolAutoConfig` -> `node_pool_auto_config`
pub fn snake_case(camel: &str) -> String {
    let mut out = String::with_capacity(camel.len() + 4);
    for c in camel.chars() {
        if c.is_ascii_uppercase() {
            out.push('_');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Valid terraform block label / construct name: `^[a-zA-Z_][a-zA-Z0-9_-]*$`
pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };

    (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn camel() {
        assert_eq!(camel_case("addons_config"), "addonsConfig");
        assert_eq!(camel_case("enable_l4_ilb_subsetting"), "enableL4IlbSubsetting");
        assert_eq!(camel_case("name"), "name");
    }

    #[test]
    fn snake() {
        assert_eq!(snake_case("addonsConfig"), "addons_config");
        assert_eq!(snake_case("enableL4IlbSubsetting"), "enable_l4_ilb_subsetting");
        assert_eq!(snake_case("node_pool"), "node_pool");
    }

    #[test]
    fn names() {
        assert!(is_valid_name("primary"));
        assert!(is_valid_name("_my-cluster_2"));
        assert!(!is_valid_name("2nd"));
        assert!(!is_valid_name(""));
        assert!(!is_valid_name("has space"));
    }
}
