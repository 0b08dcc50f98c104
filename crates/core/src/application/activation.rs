// Service Config Resolver

use crate::config::ApiConfig;
use crate::domain::{ActivationConfig, ServiceName, Transport, TransportBinding};
use crate::error::{AppError, Result};
use std::collections::BTreeSet;

/// Validate `config` and decide which services run on which transports.
///
/// Pure: the same input always yields the same output or the same error.
///
/// # Errors
/// - AppError::UnknownService for the first unrecognized name
/// - AppError::MissingDependency if the secondary JSON gateway is requested
///   without any service to forward to
pub fn resolve(config: &ApiConfig) -> Result<ActivationConfig> {
    let mut services = BTreeSet::new();
    for name in &config.services {
        services.insert(name.trim().parse::<ServiceName>()?);
    }

    if config.json_server_new && services.is_empty() {
        return Err(AppError::MissingDependency(
            "must enable at least one service along with the JSON gateway".to_string(),
        ));
    }

    let requested = [
        (config.rpc_server, Transport::Rpc, config.rpc_port),
        (config.rpc_server_new, Transport::RpcNew, config.rpc_port_new),
        (config.json_server, Transport::Json, config.json_port),
        (config.json_server_new, Transport::JsonNew, config.json_port_new),
    ];
    let transports = requested
        .into_iter()
        .filter(|(enabled, _, _)| *enabled)
        .map(|(_, transport, port)| TransportBinding { transport, port })
        .collect();

    Ok(ActivationConfig::new(
        services,
        config.host.clone(),
        transports,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn config(services: &[&str], json_server_new: bool) -> ApiConfig {
        ApiConfig {
            services: services.iter().map(|s| s.to_string()).collect(),
            json_server_new,
            ..Default::default()
        }
    }

    #[test]
    fn test_known_names_enable_services() {
        let resolved = resolve(&config(&["node", "smesher"], false)).unwrap();
        assert!(resolved.is_enabled(ServiceName::Node));
        assert!(resolved.is_enabled(ServiceName::Smesher));
        assert!(!resolved.is_enabled(ServiceName::Mesh));
        assert!(resolved.transports().is_empty());
    }

    #[test]
    fn test_unknown_name_fails_with_offending_name() {
        let err = resolve(&config(&["node", "wallet"], false)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownService);
        assert!(err.to_string().contains("wallet"));
    }

    #[test]
    fn test_unknown_name_fails_even_when_gateway_is_valid() {
        let err = resolve(&config(&["mesh", "bogus"], true)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownService);
    }

    #[test]
    fn test_gateway_without_services_is_missing_dependency() {
        let err = resolve(&config(&[], true)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingDependency);
    }

    #[test]
    fn test_gateway_flag_implies_some_service_for_all_combinations() {
        // Every subset of known services crossed with every transport flag combo
        let names = ["node", "mesh", "smesher"];
        for mask in 0u8..8 {
            let subset: Vec<&str> = names
                .iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .map(|(_, n)| *n)
                .collect();
            for flags in 0u8..16 {
                let cfg = ApiConfig {
                    services: subset.iter().map(|s| s.to_string()).collect(),
                    rpc_server: flags & 1 != 0,
                    rpc_server_new: flags & 2 != 0,
                    json_server: flags & 4 != 0,
                    json_server_new: flags & 8 != 0,
                    ..Default::default()
                };
                match resolve(&cfg) {
                    Ok(resolved) => {
                        if resolved.transport_enabled(Transport::JsonNew) {
                            assert!(resolved.services().next().is_some());
                        }
                        assert_eq!(resolved.transports().len(), flags.count_ones() as usize);
                    }
                    Err(err) => {
                        assert!(subset.is_empty() && cfg.json_server_new);
                        assert_eq!(err.kind(), ErrorKind::MissingDependency);
                    }
                }
            }
        }
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let cfg = ApiConfig {
            services: vec!["smesher".into(), "node".into(), "node".into()],
            rpc_server_new: true,
            rpc_port_new: 7000,
            ..Default::default()
        };
        let a = resolve(&cfg).unwrap();
        let b = resolve(&cfg).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.services().count(), 2);
        assert_eq!(
            a.transports(),
            &[TransportBinding {
                transport: Transport::RpcNew,
                port: 7000
            }]
        );
    }
}
