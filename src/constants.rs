// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for wapictl.
//!
//! This module contains the remote object type names, return field lists, enumerated
//! parameter values and defaults used throughout the codebase. Constants are organized
//! by category for easy maintenance.

// ============================================================================
// WAPI Endpoint Constants
// ============================================================================

/// Default WAPI version segment appended to the server URL
pub const DEFAULT_WAPI_VERSION: &str = "v2.13.1";

/// Path probed by the connectivity check (schema request, no data access)
pub const SCHEMA_PROBE_PATH: &str = "?_schema";

/// Default HTTP request timeout in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Maximum number of objects WAPI returns in a single page
pub const MAX_PAGE_SIZE: usize = 1000;

/// Maximum number of objects a list action returns when the caller gave no limit
pub const DEFAULT_MAX_RESULTS: usize = 1000;

// ============================================================================
// Remote Object Types
// ============================================================================

/// RPZ CNAME rule on a domain name
pub const OBJ_RPZ_CNAME: &str = "record:rpz:cname";

/// RPZ CNAME rule on a response IP address
pub const OBJ_RPZ_CNAME_IP: &str = "record:rpz:cname:ipaddress";

/// RPZ CNAME rule on a client IP address
pub const OBJ_RPZ_CNAME_CLIENT_IP: &str = "record:rpz:cname:clientipaddress";

/// RPZ A rule on a domain name
pub const OBJ_RPZ_A: &str = "record:rpz:a";

/// RPZ A rule on a response IP address
pub const OBJ_RPZ_A_IP: &str = "record:rpz:a:ipaddress";

/// RPZ AAAA rule on a domain name
pub const OBJ_RPZ_AAAA: &str = "record:rpz:aaaa";

/// RPZ AAAA rule on a response IP address
pub const OBJ_RPZ_AAAA_IP: &str = "record:rpz:aaaa:ipaddress";

/// RPZ MX rule
pub const OBJ_RPZ_MX: &str = "record:rpz:mx";

/// RPZ PTR rule
pub const OBJ_RPZ_PTR: &str = "record:rpz:ptr";

/// RPZ SRV rule
pub const OBJ_RPZ_SRV: &str = "record:rpz:srv";

/// RPZ NAPTR rule
pub const OBJ_RPZ_NAPTR: &str = "record:rpz:naptr";

/// RPZ TXT rule
pub const OBJ_RPZ_TXT: &str = "record:rpz:txt";

/// Prefix shared by every RPZ rule object type
pub const OBJ_RPZ_RULE_PREFIX: &str = "record:rpz:";

/// Response policy zone
pub const OBJ_ZONE_RP: &str = "zone_rp";

/// Host record
pub const OBJ_HOST: &str = "record:host";

/// IPv4 network
pub const OBJ_NETWORK: &str = "network";

/// IPv4 address (IPAM view of a single address)
pub const OBJ_IPV4_ADDRESS: &str = "ipv4address";

/// IPv6 address (IPAM view of a single address)
pub const OBJ_IPV6_ADDRESS: &str = "ipv6address";

/// DHCP lease
pub const OBJ_LEASE: &str = "lease";

// ============================================================================
// Return Field Lists
// ============================================================================

/// Return fields for CNAME rules on domain names
pub const RETURN_FIELDS_RPZ_CNAME: &str =
    "canonical,comment,disable,extattrs,name,rp_zone,ttl,use_ttl,view,zone";

/// Return fields for CNAME rules on IP and client IP addresses
pub const RETURN_FIELDS_RPZ_CNAME_IP: &str =
    "canonical,comment,disable,extattrs,name,rp_zone,ttl,use_ttl,view,zone,is_ipv4";

/// Return fields for A rules
pub const RETURN_FIELDS_RPZ_A: &str =
    "comment,disable,extattrs,ipv4addr,name,rp_zone,ttl,use_ttl,view,zone";

/// Return fields for AAAA rules
pub const RETURN_FIELDS_RPZ_AAAA: &str =
    "comment,disable,extattrs,ipv6addr,name,rp_zone,ttl,use_ttl,view,zone";

/// Return fields for MX rules
pub const RETURN_FIELDS_RPZ_MX: &str =
    "comment,disable,extattrs,mail_exchanger,name,preference,rp_zone,ttl,use_ttl,view,zone";

/// Return fields for PTR rules
pub const RETURN_FIELDS_RPZ_PTR: &str =
    "comment,disable,extattrs,ipv4addr,ipv6addr,name,ptrdname,rp_zone,ttl,use_ttl,view,zone";

/// Return fields for SRV rules
pub const RETURN_FIELDS_RPZ_SRV: &str =
    "comment,disable,extattrs,name,port,priority,rp_zone,target,ttl,use_ttl,view,weight,zone";

/// Return fields for NAPTR rules
pub const RETURN_FIELDS_RPZ_NAPTR: &str = "comment,disable,extattrs,flags,last_queried,name,order,preference,regexp,replacement,rp_zone,services,ttl,use_ttl,view,zone";

/// Return fields for TXT rules
pub const RETURN_FIELDS_RPZ_TXT: &str =
    "comment,disable,extattrs,name,rp_zone,text,ttl,use_ttl,view,zone";

/// Return fields for response policy zones
pub const RETURN_FIELDS_ZONE_RP: &str = "address,comment,disable,display_domain,dns_soa_email,extattrs,external_primaries,external_secondaries,fireeye_rule_mapping,fqdn,grid_primary,grid_secondaries,locked,locked_by,log_rpz,mask_prefix,member_soa_mnames,member_soa_serials,network_view,ns_group,parent,prefix,primary_type,record_name_policy,rpz_drop_ip_rule_enabled,rpz_drop_ip_rule_min_prefix_length_ipv4,rpz_drop_ip_rule_min_prefix_length_ipv6,rpz_last_updated_time,rpz_policy,rpz_priority,rpz_priority_end,rpz_severity,rpz_type,soa_default_ttl,soa_email,soa_expire,soa_negative_ttl,soa_refresh,soa_retry,soa_serial_number,substitute_name,use_external_primary,use_grid_zone_timer,use_log_rpz,use_record_name_policy,use_rpz_drop_ip_rule,use_soa_email,view";

/// Return fields for host records
pub const RETURN_FIELDS_HOST: &str = "aliases,allow_telnet,cli_credentials,cloud_info,comment,configure_for_dns,creation_time,ddns_protected,device_description,device_location,device_type,device_vendor,disable,disable_discovery,dns_aliases,dns_name,extattrs,ipv4addrs,ipv6addrs,last_queried,ms_ad_user_data,name,network_view,rrset_order,snmp3_credential,snmp_credential,ttl,use_cli_credentials,use_dns_ea_inheritance,use_snmp3_credential,use_snmp_credential,use_ttl,view,zone";

/// Return fields for networks
pub const RETURN_FIELDS_NETWORK: &str = "authority,bootfile,bootserver,cloud_info,comment,conflict_count,ddns_domainname,ddns_generate_hostname,ddns_server_always_updates,ddns_ttl,ddns_update_fixed_addresses,ddns_use_option81,deny_bootp,dhcp_utilization,dhcp_utilization_status,disable,discover_now_status,dynamic_hosts,email_list,enable_ddns,enable_dhcp_thresholds,enable_discovery,enable_email_warnings,enable_ifmap_publishing,enable_pxe_lease_time,enable_snmp_warnings,endpoint_sources,extattrs,high_water_mark,high_water_mark_reset,ignore_dhcp_option_list_request,ignore_id,ignore_mac_addresses,ipam_email_addresses,ipam_threshold_settings,ipam_trap_settings,ipv4addr,lease_scavenge_time,logic_filter_rules,low_water_mark,low_water_mark_reset,members,mgm_private,mgm_private_overridable,ms_ad_user_data,netmask,network,network_container,network_view,nextserver,options,pxe_lease_time,recycle_leases,rir,rir_organization,rir_registration_status,static_hosts,subscribe_settings,total_hosts,unmanaged,unmanaged_count,update_dns_on_lease_renewal,utilization";

/// Return fields for IPv4 address lookups
pub const RETURN_FIELDS_IPV4_ADDRESS: &str = "comment,conflict_types,dhcp_client_identifier,discover_now_status,discovered_data,extattrs,fingerprint,ip_address,is_conflict,is_invalid_mac,lease_state,mac_address,ms_ad_user_data,names,network,network_view,objects,reserved_port,status,types,usage,username";

/// Return fields for IPv6 address lookups
pub const RETURN_FIELDS_IPV6_ADDRESS: &str = "comment,conflict_types,discover_now_status,discovered_data,extattrs,fingerprint,ip_address,is_conflict,lease_state,ms_ad_user_data,names,network,network_view,objects,reserved_port,status,types,usage,duid";

/// Return fields for DHCP leases
pub const RETURN_FIELDS_LEASE: &str = "address,billing_class,binding_state,client_hostname,cltt,discovered_data,ends,fingerprint,hardware,ipv6_duid,ipv6_iaid,ipv6_preferred_lifetime,ipv6_prefix_bits,is_invalid_mac,ms_ad_user_data,network,network_view,never_ends,never_starts,next_binding_state,on_commit,on_expiry,on_release,option,protocol,remote_id,served_by,server_host_name,starts,tsfp,tstp,uid,username,variable";

// ============================================================================
// Rule Canonical Values
// ============================================================================

/// Canonical value for "Block (No such domain)" rules
pub const CANONICAL_BLOCK_NO_DOMAIN: &str = "";

/// Canonical value (wildcard marker) for "Block (No data)" rules
pub const CANONICAL_WILDCARD: &str = "*";

/// Canonical value for passthru rules on client IP addresses
pub const CANONICAL_PASSTHRU: &str = "rpz-passthru";

/// Canonical value for passthru rules on wildcard domain names
pub const CANONICAL_WILDCARD_PASSTHRU: &str = "infoblox-passthru";

/// View applied to CNAME rules created without an explicit view
pub const DEFAULT_VIEW: &str = "default";

// ============================================================================
// Enumerated Parameter Values
// ============================================================================

/// Accepted values for the IP lookup `status` filter
pub const IP_LOOKUP_STATUS_VALUES: &[&str] = &["ALL", "ACTIVE", "UNUSED", "USED"];

/// Accepted values for the DHCP lease `protocol` filter
pub const LEASE_PROTOCOL_VALUES: &[&str] = &["BOTH", "IPV4", "IPV6"];

/// Lease protocol value that adds no filter
pub const LEASE_PROTOCOL_BOTH: &str = "BOTH";

/// Accepted values for a response policy zone's `rpz_policy`
pub const RPZ_POLICY_VALUES: &[&str] = &[
    "DISABLED",
    "GIVEN",
    "NODATA",
    "NXDOMAIN",
    "PASSTHRU",
    "SUBSTITUTE",
];

/// Accepted values for a response policy zone's `rpz_severity`
pub const RPZ_SEVERITY_VALUES: &[&str] = &["CRITICAL", "MAJOR", "WARNING", "INFORMATIONAL"];

/// Accepted values for a response policy zone's `rpz_type`
pub const RPZ_TYPE_VALUES: &[&str] = &["FEED", "FIREEYE", "LOCAL"];

/// Upper bound for 16-bit record fields (priority, weight, port, preference, order)
pub const MAX_U16_FIELD: u64 = 65_535;

/// Maximum accepted length of a `comment` parameter
pub const MAX_COMMENT_LEN: usize = 256;

// ============================================================================
// Configuration Environment Variables
// ============================================================================

/// Overrides the configured server URL
pub const ENV_WAPI_URL: &str = "WAPI_URL";

/// Overrides the configured username
pub const ENV_WAPI_USERNAME: &str = "WAPI_USERNAME";

/// Overrides the configured password
pub const ENV_WAPI_PASSWORD: &str = "WAPI_PASSWORD";

/// Path of the settings file used when `--config` is not given
pub const ENV_WAPICTL_CONFIG: &str = "WAPICTL_CONFIG";

/// Log output format (`text` or `json`)
pub const ENV_LOG_FORMAT: &str = "RUST_LOG_FORMAT";
