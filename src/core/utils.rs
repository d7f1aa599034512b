/*-------------------------------------------------------------------------------------------------
  Utilities
-------------------------------------------------------------------------------------------------*/

/*--------------------------------------------------------------------------------------
  IP Network Supplemental Functions
--------------------------------------------------------------------------------------*/

pub mod ipnetwork {
    use ipnetwork::{IpNetwork, Ipv4Network, Ipv6Network};

    /*
        The IpNetwork type does not reduce (or provide a method to reduce) an
        interface CIDR prefix to a network prefix (where all host bits are set
        to `0`). It does provide a network() method that will extract the
        network IP.

        This helper function extracts the network prefix from an IpNetwork,
        which normalizes CIDR strings like `10.0.0.5/24` to `10.0.0.0/24`.
    */

    pub fn network_prefix(ip_network: &IpNetwork) -> IpNetwork {
        match ip_network {
            IpNetwork::V4(ipv4_network) => IpNetwork::V4(
                Ipv4Network::new(ipv4_network.network(), ipv4_network.prefix()).unwrap(),
            ),
            IpNetwork::V6(ipv6_network) => IpNetwork::V6(
                Ipv6Network::new(ipv6_network.network(), ipv6_network.prefix()).unwrap(),
            ),
        }
    }
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/
