//! Built-in process → daemon mapping.
//!
//! Order is significant: the first matching entry wins. An empty daemon name
//! marks a process that is recognized but has no unit to restart.

use super::PatternKind::{self, Prefix, Regex};

pub(super) const BUILTIN_MAPPING: &[(PatternKind, &str, &str)] = &[
    (Prefix, "/usr/bin/python3 -s /usr/sbin/firewalld", "firewalld"),
    (Prefix, "/usr/bin/dbus-daemon", "dbus"),
    (Prefix, "/usr/bin/dbus-broker", "dbus"),
    (Prefix, "dbus-broker", "dbus"),
    (Prefix, "/usr/lib/polkit-1/polkitd", "polkit"),
    (Prefix, "/usr/sbin/atd", "atd"),
    (Prefix, "/usr/sbin/crond", "crond"),
    (Prefix, "/usr/sbin/smartd", "smartd"),
    (Prefix, "/usr/sbin/httpd", "httpd"),
    (Prefix, "/usr/libexec/mysqld", "mysqld"),
    (Prefix, "/usr/libexec/platform-python /usr/libexec/rhsm-service", "rhsm"),
    (Prefix, "/usr/sbin/wpa_supplicant", "wpa_supplicant"),
    (Prefix, "/usr/libexec/upowerd", "upower"),
    (Prefix, "/usr/libexec/accounts-daemon", "accounts-daemon"),
    (Prefix, "/usr/libexec/packagekitd", "packagekit"),
    (Prefix, "/usr/sbin/keepalived", "keepalived"),
    (Prefix, "/usr/sbin/lvmetad", ""),
    (Prefix, "/sbin/rpcbind", "rpcbind"),
    (Prefix, "/usr/bin/rpcbind", "rpcbind"),
    (Prefix, "/usr/sbin/rpc.statd", "rpc-statd"),
    (Prefix, "/usr/sbin/rpc.mountd", "nfs-mountd"),
    (Prefix, "/usr/sbin/nfsdcld", "nfsdcld"),
    (Prefix, "/usr/sbin/sedispatch", ""),
    (Prefix, "/sbin/auditd", "auditd"),
    (Prefix, "/usr/libexec/postfix/master", "postfix"),
    (Prefix, "/usr/sbin/rsyslogd", "rsyslog"),
    (Prefix, "/usr/sbin/syslog-ng", "syslog-ng"),
    (Prefix, "/usr/sbin/xrdp", "xrdp"),
    (Prefix, "qmgr", "postfix"),
    (Prefix, "tlsmgr", "postfix"),
    (Prefix, "/usr/libexec/platform-python -Es /usr/sbin/tuned", "tuned"),
    (Prefix, "/usr/bin/python3 -Es /usr/sbin/tuned", "tuned"),
    (
        Prefix,
        "/opt/puppetlabs/puppet/bin/ruby /opt/puppetlabs/puppet/bin/puppet",
        "puppet",
    ),
    (Prefix, "/usr/sbin/sshd", "sshd"),
    (Prefix, "sshd", ""),
    (Prefix, "/usr/sbin/NetworkManager", "NetworkManager"),
    (Prefix, "/usr/sbin/sssd", "sssd"),
    (Prefix, "/usr/libexec/sssd/sssd_ssh", "sssd"),
    (Prefix, "/usr/libexec/sssd/sssd_pam", "sssd"),
    (Prefix, "/usr/libexec/sssd/sssd_nss", "sssd"),
    (Prefix, "/usr/libexec/sssd/sssd_be", "sssd"),
    (Prefix, "/usr/libexec/platform-python -s /usr/sbin/firewalld", "firewalld"),
    (Prefix, "/usr/bin/python2 -Es /usr/sbin/firewalld", "firewalld"),
    (Prefix, "/opt/bacula/bin/bacula-fd", "bacula-fd"),
    (Prefix, "/usr/sbin/bacula-fd", "bacula-fd"),
    (Prefix, "/usr/sbin/chronyd", "chronyd"),
    // Trailing space keeps this from swallowing systemd-udevd and friends.
    (Prefix, "/usr/lib/systemd/systemd ", "systemd"),
    (Prefix, "/usr/lib/systemd/systemd-udevd", "systemd-udevd"),
    (Prefix, "/usr/lib/systemd/systemd-journald", "systemd-journald"),
    (Prefix, "/usr/lib/systemd/systemd-logind", "systemd-logind"),
    (Prefix, "/usr/lib/systemd/systemd-machined", "systemd-machined"),
    (Prefix, "/usr/lib/systemd/systemd  --switched-root", "systemd"),
    (Prefix, "/usr/lib/systemd/systemd --system", "systemd"),
    (Prefix, "/usr/bin/rhsmcertd", "rhsmcertd"),
    (Prefix, "/usr/sbin/clamd", "clamd@*"),
    (Prefix, "/usr/bin/freshclam", "clamav-freshclam"),
    (Prefix, "/usr/sbin/xinetd", "xinetd"),
    (Prefix, "/usr/sbin/radiusd", "radiusd"),
    (Prefix, "/usr/sbin/named", "named"),
    // https://bugzilla.redhat.com/show_bug.cgi?id=1070403
    (Prefix, "(sd-pam)", ""),
    (Prefix, "login ", ""),
    (Prefix, "/usr/libexec/pcp/bin/pmcd", "pmcd"),
    (Prefix, "/usr/libexec/pcp/bin/pmlogger", "pmlogger"),
    (Prefix, "/usr/libexec/pcp/bin/pmpause", "pmlogger"),
    (Prefix, "/var/lib/pcp/", "pmcd"),
    (Prefix, "/usr/local/qualys/cloud-agent/", "qualys-cloud-agent"),
    (Prefix, "/opt/nessus_agent/sbin/", "nessusagent"),
    (Prefix, "/bin/bash /usr/bin/check_mk_agent", "check_mk-async"),
    (Prefix, "/usr/sbin/dhcpd", "dhcpd"),
    (Prefix, "/usr/local/bin/c-icap", "c-icap"),
    (Prefix, "/usr/sbin/squid", "squid"),
    (Prefix, "/usr/sbin/irqbalance", "irqbalance"),
    (Prefix, "/usr/sbin/mcelog", "mcelog"),
    (Prefix, "/usr/libexec/udisks2/udisksd", "udisks2"),
    (Prefix, "/usr/libexec/platform-python /usr/bin/virt-who", "virt-who"),
    (Prefix, "/usr/bin/lsmd ", "libstoragemgmt"),
    (Regex, r"^/sbin/agetty .* tty1 ", "getty@tty1"),
];
