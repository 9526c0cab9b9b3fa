use crate::config::AppConfig;

impl AppConfig {
    pub fn display_config(&self) {
        println!("\n=== Parsed Servers: {} ===", self.servers.len());
        for (i, server) in self.servers.iter().enumerate() {
            println!("Server #{}", i + 1);
            println!("  Listen: {}:{}", server.host, server.port);
            println!("  Server Name: {}", server.server_name);
            println!("  Root: {}", server.root);
            println!("  Index Files: {}", server.index_files.join(", "));
            println!("  Client Max Body Size: {}", server.client_max_body_size);
            println!("  Client Timeout: {}s", server.client_timeout);

            if server.error_pages.is_empty() {
                println!("  Error Pages: (none)");
            } else {
                println!("  Error Pages:");
                let mut pages: Vec<_> = server.error_pages.iter().collect();
                pages.sort_by_key(|(code, _)| **code);
                for (code, path) in pages {
                    println!("    {code} -> {path}");
                }
            }

            println!("  Locations: {}", server.locations.len());
            for (j, loc) in server.locations.iter().enumerate() {
                println!("    Location #{}: {}", j + 1, loc.location);
                if !loc.path.is_empty() {
                    println!("      Path: {}", loc.path);
                }
                println!("      Methods: {}", loc.allowed_methods.join(", "));
                println!("      Autoindex: {}", if loc.autoindex { "on" } else { "off" });
                if !loc.upload_dir.is_empty() {
                    println!("      Upload Dir: {}", loc.upload_dir);
                }
                if !loc.cgi_extensions.is_empty() {
                    println!("      CGI Extensions: {}", loc.cgi_extensions.join(", "));
                }
                if !loc.fastcgi_pass.is_empty() {
                    println!("      FastCGI Pass: {}", loc.fastcgi_pass);
                }
                if let (Some(code), Some(target)) = (loc.redirect_code, &loc.redirect_target) {
                    println!("      Redirect: {code} -> {target}");
                }
            }

            if i + 1 != self.servers.len() {
                println!();
            }
        }
        println!();
    }
}
